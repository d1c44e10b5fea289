//! The timeline cache store.
//!
//! Everything the pipeline and the reader share lives here: compact tweet and user records,
//! the pending queue and processed set owned by the dedup gate, the follower sets written
//! by the follow graph, and one timeline list per follower.  See [`Keys`] for the layout.
//!
//! Two implementations of [`Store`] are provided: [`RedisStore`], which speaks RESP to a
//! Redis server, and [`MemStore`], which keeps everything in process.
mod batch;
mod err;
mod keys;
mod mem;
pub mod redis;

pub use batch::{Batch, Write};
pub use err::StoreErr;
pub use keys::Keys;
pub use mem::MemStore;
pub use redis::RedisStore;

use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StoreErr>;

/// The primitives the core needs from its store.
///
/// Every method is a single round trip.  Absent keys are never errors: `get`/`mget` return
/// `None` in their place and `smembers`/`lrange` return empty lists.  Values come back as
/// the raw bytes stored; ids and members must be UTF-8.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Fetch many values at once; the output lines up with `keys`.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// Read the inclusive range `[start, stop]` of a list.
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Pop from the right end of `queue` until an item not yet in `seen` turns up, add it to
    /// `seen` and return it.  Atomic with respect to every other caller.
    async fn pop_unseen(&self, queue: &str, seen: &str) -> Result<Option<String>>;

    /// Apply every write in `batch` as one unit.
    async fn exec(&self, batch: Batch) -> Result<()>;
}
