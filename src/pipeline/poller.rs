use super::DedupGate;
use crate::config;
use crate::store::Store;

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;

/// Feeds admitted ids to the workers.
#[derive(Debug)]
pub struct Poller<S> {
    gate: DedupGate<S>,
    tx: mpsc::Sender<String>,
    err_backoff: Duration,
    empty_backoff: Duration,
}

impl<S: Store> Poller<S> {
    pub fn new(gate: DedupGate<S>, tx: mpsc::Sender<String>, cfg: &config::Pipeline) -> Self {
        Self {
            gate,
            tx,
            err_backoff: *cfg.poll_err_backoff,
            empty_backoff: *cfg.poll_empty_backoff,
        }
    }

    /// Poll until every worker is gone.  Store errors never end the loop.
    pub async fn run(self) {
        loop {
            if self.tx.is_closed() {
                break;
            }
            match self.gate.try_admit().await {
                Ok(Some(tweet_id)) => {
                    log::debug!("Admitted tweet {}", tweet_id);
                    // Waits here while every worker is busy and the channel is full
                    if let Err(unsent) = self.tx.send(tweet_id).await {
                        log::error!("Dropped tweet {}: no worker left to take it", unsent.0);
                        break;
                    }
                }
                Ok(None) => time::sleep(self.empty_backoff).await,
                Err(e) => {
                    log::warn!("Could not poll the tweet queue: {}", e);
                    time::sleep(self.err_backoff).await
                }
            }
        }
        log::info!("Poller stopped");
    }
}
