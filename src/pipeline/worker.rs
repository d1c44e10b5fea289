use super::Fanout;
use crate::store::Store;

use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Running totals across every worker in a pool.
#[derive(Debug, Default)]
pub struct Stats {
    admitted: AtomicU64,
    done: AtomicU64,
    failed: AtomicU64,
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub admitted: u64,
    pub done: u64,
    pub failed: u64,
}

impl StatsSnapshot {
    /// Tweets a worker has taken but not yet finished.
    pub fn in_flight(&self) -> u64 {
        self.admitted.saturating_sub(self.done + self.failed)
    }
}

impl Stats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            admitted: self.admitted.load(Ordering::Relaxed),
            done: self.done.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// A fixed number of tasks sharing one receiver.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    stats: Arc<Stats>,
}

impl WorkerPool {
    pub fn spawn<S: Store>(
        workers: usize,
        fanout: Arc<Fanout<S>>,
        rx: mpsc::Receiver<String>,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(Stats::default());
        let handles = (0..workers)
            .map(|n| tokio::spawn(work(n, fanout.clone(), rx.clone(), stats.clone())))
            .collect();
        Self { handles, stats }
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    /// Wait for every worker to exit, which they do once the channel is closed and drained.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("A fan-out worker ended abnormally: {}", e);
            }
        }
    }
}

async fn work<S: Store>(
    n: usize,
    fanout: Arc<Fanout<S>>,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    stats: Arc<Stats>,
) {
    loop {
        let next = rx.lock().await.recv().await;
        let tweet_id = match next {
            Some(tweet_id) => tweet_id,
            None => break,
        };
        stats.admitted.fetch_add(1, Ordering::Relaxed);

        // A panic inside one fan-out only fails that tweet
        match AssertUnwindSafe(fanout.fanout(&tweet_id))
            .catch_unwind()
            .await
        {
            Ok(Ok(reached)) => {
                stats.done.fetch_add(1, Ordering::Relaxed);
                log::info!("Worker {}: tweet {} fanned out to {}", n, tweet_id, reached);
            }
            Ok(Err(e)) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("Worker {}: fan-out of tweet {} failed: {}", n, tweet_id, e);
            }
            Err(_panic) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("Worker {}: fan-out of tweet {} panicked", n, tweet_id);
            }
        }
    }
    log::debug!("Worker {} exiting", n);
}
