//! The fan-out-on-write pipeline.
//!
//! One [`Poller`] drains the pending queue through the [`DedupGate`] and hands each admitted
//! tweet id to a [`WorkerPool`] over a bounded channel.  Each worker runs the [`Fanout`]
//! writer for one tweet at a time.  When the channel is full the poller waits, so a slow
//! store holds ids in Redis instead of in memory.
//!
//! Per tweet: `Pending -> Admitted -> Processing -> Done | Failed`.  Nothing is retried:
//! an id that fails (or is lost to a restart after admission) stays in the processed set
//! and is never admitted again.
mod err;
mod fanout;
mod gate;
mod poller;
mod worker;

pub use err::FanoutErr;
pub use fanout::Fanout;
pub use gate::DedupGate;
pub use poller::Poller;
pub use worker::{Stats, StatsSnapshot, WorkerPool};

use crate::config;
use crate::store::{Keys, Store};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A running poller and its worker pool.
#[derive(Debug)]
pub struct Running {
    poller: JoinHandle<()>,
    pool: WorkerPool,
}

/// Start the poller and `cfg.workers` workers on the current runtime.
pub fn spawn<S: Store>(store: Arc<S>, keys: Keys, cfg: &config::Pipeline) -> Running {
    let (tx, rx) = mpsc::channel(*cfg.queue_capacity);
    let fanout = Arc::new(Fanout::new(store.clone(), keys.clone(), cfg));
    let pool = WorkerPool::spawn(*cfg.workers, fanout, rx);
    let poller = Poller::new(DedupGate::new(store, &keys), tx, cfg);
    log::info!(
        "Started fan-out with {} workers and room for {} pending tweets",
        *cfg.workers,
        *cfg.queue_capacity
    );
    Running {
        poller: tokio::spawn(poller.run()),
        pool,
    }
}

impl Running {
    pub fn stats(&self) -> Arc<Stats> {
        self.pool.stats()
    }

    /// Stop admitting tweets, let the workers finish what they already hold, and wait for them.
    pub async fn shutdown(self) {
        self.poller.abort();
        match self.poller.await {
            Err(e) if e.is_panic() => log::error!("The poller panicked: {}", e),
            _ => (),
        }
        self.pool.join().await;
        log::info!("Fan-out stopped");
    }
}
