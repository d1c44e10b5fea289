use super::{Batch, Result, Store, StoreErr, Write};

use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Data {
    strings: HashMap<String, Vec<u8>>,
    lists: HashMap<String, VecDeque<String>>,
    sets: HashMap<String, HashSet<String>>,
}

/// An in-process [`Store`] with Redis semantics for the commands the core uses.
///
/// Every operation, including a whole [`Batch`], runs under one lock, so `pop_unseen` and
/// `exec` are atomic just as the Redis script and transaction are.
#[derive(Debug, Default)]
pub struct MemStore {
    data: Mutex<Data>,
    unavailable: AtomicBool,
    fail_next_exec: AtomicBool,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> Result<MutexGuard<'_, Data>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreErr::Unavailable);
        }
        Ok(self
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Make every following operation fail with [`StoreErr::Unavailable`] until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next [`Store::exec`] fail without applying any of its writes.
    pub fn fail_next_exec(&self) {
        self.fail_next_exec.store(true, Ordering::SeqCst);
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_bytes(key, value.as_bytes())
    }

    pub fn set_bytes(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut data = self.data()?;
        data.strings.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    pub fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self
            .data()?
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    pub fn lpush(&self, key: &str, value: &str) -> Result<usize> {
        let mut data = self.data()?;
        let list = data.lists.entry(key.to_string()).or_default();
        list.push_front(value.to_string());
        Ok(list.len())
    }

    pub fn del(&self, key: &str) -> Result<bool> {
        let mut data = self.data()?;
        let removed = data.strings.remove(key).is_some()
            | data.lists.remove(key).is_some()
            | data.sets.remove(key).is_some();
        Ok(removed)
    }

    /// The whole list at `key`, leftmost (newest) first.
    pub fn list(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .data()?
            .lists
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default())
    }

    pub fn llen(&self, key: &str) -> Result<usize> {
        Ok(self.data()?.lists.get(key).map_or(0, VecDeque::len))
    }
}

/// Resolve Redis-style inclusive, possibly negative, indices against a list of `len` items.
fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 {
        (len + start).max(0)
    } else {
        start
    };
    let stop = if stop < 0 {
        len + stop
    } else {
        stop.min(len - 1)
    };
    (start <= stop && start < len).then(|| (start as usize, stop as usize))
}

impl Data {
    fn apply(&mut self, write: Write) {
        match write {
            Write::Set { key, value } => {
                self.strings.insert(key, value.into_bytes());
            }
            Write::LPush { key, value } => self.lists.entry(key).or_default().push_front(value),
            Write::LTrim { key, start, stop } => {
                if let Some(list) = self.lists.get_mut(&key) {
                    match resolve_range(list.len(), start, stop) {
                        Some((start, stop)) => {
                            list.truncate(stop + 1);
                            list.drain(..start);
                        }
                        None => list.clear(),
                    }
                    if list.is_empty() {
                        self.lists.remove(&key);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data()?.strings.get(key).cloned())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let data = self.data()?;
        Ok(keys.iter().map(|k| data.strings.get(k).cloned()).collect())
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .data()?
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let data = self.data()?;
        let list = match data.lists.get(key) {
            Some(list) => list,
            None => return Ok(Vec::new()),
        };
        Ok(match resolve_range(list.len(), start, stop) {
            Some((start, stop)) => list.range(start..=stop).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn pop_unseen(&self, queue: &str, seen: &str) -> Result<Option<String>> {
        let mut data = self.data()?;
        let Data { lists, sets, .. } = &mut *data;
        while let Some(id) = lists.get_mut(queue).and_then(VecDeque::pop_back) {
            if sets.entry(seen.to_string()).or_default().insert(id.clone()) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    async fn exec(&self, batch: Batch) -> Result<()> {
        let mut data = self.data()?;
        if self.fail_next_exec.swap(false, Ordering::SeqCst) {
            return Err(StoreErr::RedisReplyErr(
                "EXECABORT injected failure".to_string(),
            ));
        }
        for write in batch {
            data.apply(write);
        }
        Ok(())
    }
}
