//! Network actor - runs sends in the Tokio runtime so the host stays responsive

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::error::NetworkError;
use crate::network::client::execute_cancellable;
use crate::network::messages::{NetworkCommand, NetworkResponse};

/// Network actor that processes send and cancel commands
pub struct NetworkActor {
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    cancel_handles: HashMap<u64, oneshot::Sender<()>>,
}

impl NetworkActor {
    pub fn new(response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { id, request, auth }) => {
                            // Ids key the cancel handles, so one may not be reused while in flight
                            if self.cancel_handles.contains_key(&id) {
                                tracing::warn!(id, "Request id already in flight");
                                let _ = self.response_tx.send(NetworkResponse::Error {
                                    id,
                                    error: NetworkError::DuplicateId(id),
                                });
                                continue;
                            }
                            let (cancel_tx, cancel_rx) = oneshot::channel();
                            self.cancel_handles.insert(id, cancel_tx);
                            let response_tx = self.response_tx.clone();

                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = %request.method, "Executing request");
                                let result = execute_cancellable(&request, auth.as_ref(), cancel_rx).await;
                                let _ = response_tx.send(NetworkResponse::from_result(id, result));
                                id
                            });
                        }

                        Some(NetworkCommand::Cancel(id)) => {
                            if let Some(cancel_tx) = self.cancel_handles.remove(&id) {
                                tracing::info!(id, "Cancelling request");
                                let _ = cancel_tx.send(());
                            }
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            for (_, cancel_tx) in self.cancel_handles.drain() {
                                let _ = cancel_tx.send(());
                            }
                            break;
                        }
                    }
                }

                Some(done) = self.active_requests.join_next() => {
                    if let Ok(id) = done {
                        self.cancel_handles.remove(&id);
                    }
                }
            }
        }

        // Let cancelled tasks report before the actor goes away
        while self.active_requests.join_next().await.is_some() {}
    }
}
