//! Network messages - communication between the host and the network actor

use crate::error::NetworkError;
use crate::models::{Auth, Request};
use crate::network::client::HttpResponse;

/// Commands sent to the network actor
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a request. Placeholders must already be resolved.
    Execute {
        id: u64,
        request: Request,
        auth: Option<Auth>,
    },
    /// Cancel a pending request
    Cancel(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent back by the network actor
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResponse {
    Success { id: u64, response: HttpResponse },
    Error { id: u64, error: NetworkError },
    Cancelled { id: u64 },
}

impl NetworkResponse {
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Success { id, .. } => *id,
            NetworkResponse::Error { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }

    pub(crate) fn from_result(id: u64, result: Result<HttpResponse, NetworkError>) -> Self {
        match result {
            Ok(response) => NetworkResponse::Success { id, response },
            Err(NetworkError::Cancelled) => NetworkResponse::Cancelled { id },
            Err(error) => NetworkResponse::Error { id, error },
        }
    }
}
