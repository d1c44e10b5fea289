use super::{ReadErr, Window};
use crate::config;
use crate::record::{self, TimelineEntry, Tweet, User};
use crate::store::{Keys, Store};

use hashbrown::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

type Result<T> = std::result::Result<T, ReadErr>;

/// Assembles pages of a user's home timeline from cached records.
#[derive(Debug)]
pub struct Reader<S> {
    store: Arc<S>,
    keys: Keys,
    timeout: Duration,
}

impl<S> Clone for Reader<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            keys: self.keys.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: Store> Reader<S> {
    pub fn new(store: Arc<S>, keys: Keys, cfg: &config::Pipeline) -> Self {
        Self {
            store,
            keys,
            timeout: *cfg.read_timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Page `page` (counting from 1) of `size` entries, each tweet joined with its author.
    pub async fn paginate(
        &self,
        user_id: &str,
        page: usize,
        size: usize,
    ) -> Result<Vec<TimelineEntry>> {
        let window = Window::page(page, size)?;
        self.bounded(self.entries(user_id, window)).await
    }

    /// `limit` tweets starting `offset` entries from the newest, without author details.
    pub async fn paginate_tweets(
        &self,
        user_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Tweet>> {
        self.bounded(self.tweets(user_id, Window::offset(limit, offset)))
            .await
    }

    async fn bounded<T>(&self, read: impl Future<Output = Result<T>>) -> Result<T> {
        time::timeout(self.timeout, read)
            .await
            .map_err(|_elapsed| ReadErr::Timeout(self.timeout))?
    }

    async fn tweets(&self, user_id: &str, window: Window) -> Result<Vec<Tweet>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let tweet_ids = self
            .store
            .lrange(&self.keys.timeline(user_id), window.start(), window.stop())
            .await?;
        if tweet_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tweet_keys: Vec<String> = tweet_ids.iter().map(|id| self.keys.tweet(id)).collect();
        let records = self.store.mget(&tweet_keys).await?;

        let mut tweets = Vec::with_capacity(tweet_ids.len());
        for ((tweet_id, key), raw) in tweet_ids.into_iter().zip(&tweet_keys).zip(records) {
            match raw {
                Some(raw) => {
                    let mut tweet: Tweet = record::decode(key, &raw)?;
                    tweet.id = tweet_id;
                    tweets.push(tweet);
                }
                None => log::debug!("Skipping tweet {} for {}: not cached", tweet_id, user_id),
            }
        }
        Ok(tweets)
    }

    async fn entries(&self, user_id: &str, window: Window) -> Result<Vec<TimelineEntry>> {
        let tweets = self.tweets(user_id, window).await?;
        if tweets.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids: Vec<String> = {
            let mut seen = HashSet::with_capacity(tweets.len());
            tweets
                .iter()
                .filter(|tweet| seen.insert(tweet.user_id.as_str()))
                .map(|tweet| tweet.user_id.clone())
                .collect()
        };
        let author_keys: Vec<String> = author_ids.iter().map(|id| self.keys.user(id)).collect();
        let records = self.store.mget(&author_keys).await?;

        let mut authors: HashMap<String, User> = HashMap::with_capacity(author_ids.len());
        for ((author_id, key), raw) in author_ids.into_iter().zip(&author_keys).zip(records) {
            if let Some(raw) = raw {
                authors.insert(author_id, record::decode(key, &raw)?);
            }
        }

        Ok(tweets
            .into_iter()
            .filter_map(|tweet| match authors.get(&tweet.user_id) {
                Some(author) => Some(TimelineEntry::new(tweet, author)),
                None => {
                    log::debug!(
                        "Skipping tweet {}: author {} not cached",
                        tweet.id,
                        tweet.user_id
                    );
                    None
                }
            })
            .collect())
    }
}
