use super::FanoutErr;
use crate::config;
use crate::record::{self, Tweet};
use crate::store::{Batch, Keys, Store};

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// Writes one tweet into the home timeline of every follower of its author.
#[derive(Debug)]
pub struct Fanout<S> {
    store: Arc<S>,
    keys: Keys,
    timeout: Duration,
    max_len: Option<usize>,
}

impl<S: Store> Fanout<S> {
    pub fn new(store: Arc<S>, keys: Keys, cfg: &config::Pipeline) -> Self {
        Self {
            store,
            keys,
            timeout: *cfg.fanout_timeout,
            max_len: cfg.max_len(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap every timeline this writer touches at `max_len` entries (`None` for no cap).
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len.filter(|len| *len > 0);
        self
    }

    /// Prepend `tweet_id` to each follower's timeline, returning how many timelines were
    /// written.
    ///
    /// All timeline writes go to the store as one batch: either every follower gets the
    /// tweet or none does.  An author with no followers is not an error.
    pub async fn fanout(&self, tweet_id: &str) -> Result<usize, FanoutErr> {
        let tweet_key = self.keys.tweet(tweet_id);
        let raw = self
            .store
            .get(&tweet_key)
            .await?
            .ok_or_else(|| FanoutErr::TweetNotFound(tweet_key.clone()))?;
        let tweet: Tweet = record::decode(&tweet_key, &raw)?;

        let followers = self
            .store
            .smembers(&self.keys.followers(&tweet.user_id))
            .await?;
        if followers.is_empty() {
            log::debug!("Tweet {} has no one to reach", tweet_id);
            return Ok(0);
        }

        let mut batch = Batch::with_capacity(followers.len() * 2);
        for follower in &followers {
            let timeline = self.keys.timeline(follower);
            batch.lpush(timeline.clone(), tweet_id.to_string());
            if let Some(max_len) = self.max_len {
                batch.ltrim(timeline, 0, max_len as i64 - 1);
            }
        }
        time::timeout(self.timeout, self.store.exec(batch))
            .await
            .map_err(|_elapsed| FanoutErr::Timeout(self.timeout))??;

        log::debug!("Tweet {} reached {} timelines", tweet_id, followers.len());
        Ok(followers.len())
    }
}
