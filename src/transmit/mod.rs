//! Fire-and-forget delivery of decoded text

use std::future::Future;

use flume::Receiver;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::TransmitError;

/// Where decoded results go and who reports them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub worker: String,
}

/// Transmission collaborator
pub trait Transmitter: Send + Sync + 'static {
    fn send(
        &self,
        endpoint: &Endpoint,
        text: &str,
    ) -> impl Future<Output = Result<(), TransmitError>> + Send;
}

/// Writes results to the log instead of the network
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransmitter;

impl Transmitter for LogTransmitter {
    async fn send(&self, endpoint: &Endpoint, text: &str) -> Result<(), TransmitError> {
        info!(url = %endpoint.url, worker = %endpoint.worker, "Decoded: {}", text);
        Ok(())
    }
}

/// Forward every decoded result to `transmitter` until all senders are gone.
///
/// Failures are logged and never reach the frame path.
pub fn spawn_worker<T: Transmitter>(
    transmitter: T,
    endpoint: Endpoint,
    results: Receiver<String>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut sent = 0u64;
        while let Ok(text) = results.recv_async().await {
            match transmitter.send(&endpoint, &text).await {
                Ok(()) => {
                    sent += 1;
                    info!("Sent {}", text);
                }
                Err(e) => warn!("Send failed: {}", e),
            }
        }
        sent
    })
}
