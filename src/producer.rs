//! The writes the tweet-creation path owes the pipeline.
//!
//! A tweet becomes eligible for fan-out once its record is cached and its id is on the
//! pending queue.  If `publish` fails the tweet stays out of every home timeline; the caller
//! decides whether to retry.
use crate::record::{self, Tweet, User};
use crate::store::{Batch, Keys, Store, StoreErr};

use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub enum ProduceErr {
    Encode(serde_json::Error),
    Store(StoreErr),
}

impl std::error::Error for ProduceErr {}

impl fmt::Display for ProduceErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use ProduceErr::*;
        match self {
            Encode(inner) => write!(f, "could not encode record: {}", inner),
            Store(inner) => write!(f, "{}", inner),
        }?;
        Ok(())
    }
}

impl From<serde_json::Error> for ProduceErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

impl From<StoreErr> for ProduceErr {
    fn from(e: StoreErr) -> Self {
        Self::Store(e)
    }
}

#[derive(Debug)]
pub struct Producer<S> {
    store: Arc<S>,
    keys: Keys,
}

impl<S: Store> Producer<S> {
    pub fn new(store: Arc<S>, keys: Keys) -> Self {
        Self { store, keys }
    }

    /// Cache `tweet` and queue it for fan-out, in one batch.
    pub async fn publish(&self, tweet: &Tweet) -> Result<(), ProduceErr> {
        let mut batch = Batch::with_capacity(2);
        batch
            .set(self.keys.tweet(&tweet.id), record::encode(tweet)?)
            .lpush(self.keys.queue(), tweet.id.clone());
        self.store.exec(batch).await.map_err(|e| {
            log::error!("Could not publish tweet {}: {}", tweet.id, e);
            e
        })?;
        log::debug!("Queued tweet {} for fan-out", tweet.id);
        Ok(())
    }

    /// Refresh the display fields readers see for `user`.
    pub async fn cache_user(&self, user: &User) -> Result<(), ProduceErr> {
        let mut batch = Batch::with_capacity(1);
        batch.set(self.keys.user(&user.id), record::encode(user)?);
        self.store.exec(batch).await.map_err(|e| {
            log::error!("Could not cache user {}: {}", user.id, e);
            e
        })?;
        Ok(())
    }
}
