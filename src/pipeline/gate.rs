use crate::store::{self, Keys, Store};

use std::sync::Arc;

/// Admits each queued tweet id at most once, however many times it was enqueued.
#[derive(Debug)]
pub struct DedupGate<S> {
    store: Arc<S>,
    queue: String,
    processed: String,
}

impl<S: Store> DedupGate<S> {
    pub fn new(store: Arc<S>, keys: &Keys) -> Self {
        Self {
            store,
            queue: keys.queue(),
            processed: keys.processed(),
        }
    }

    /// Pop the oldest pending id that has never been admitted, recording it as admitted.
    ///
    /// `None` means the queue held nothing new.  Ids popped but already admitted are
    /// discarded.
    pub async fn try_admit(&self) -> store::Result<Option<String>> {
        self.store.pop_unseen(&self.queue, &self.processed).await
    }
}
