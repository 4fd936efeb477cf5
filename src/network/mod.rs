//! Network layer - sends resolved requests
//!
//! `client` does the actual HTTP work; the actor runs sends as cancellable
//! background tasks and reports back over a channel.

pub mod actor;
pub mod client;
pub mod messages;

pub use actor::NetworkActor;
pub use client::{create_client, execute_cancellable, execute_request, HttpResponse};
pub use messages::{NetworkCommand, NetworkResponse};
