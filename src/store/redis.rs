//! A [`Store`] backed by Redis, spoken to directly over RESP.
mod cmd;
mod connection;
mod reply;

pub use reply::{RedisParseErr, Reply};

use self::cmd::RedisCmd;
use self::connection::RedisConn;
use super::{Batch, Result, Store, StoreErr};
use crate::config;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Pops until it finds an id that has never been admitted, so a duplicate in the queue does
/// not cost the poller an empty-queue backoff.  `false` becomes a null reply.
const POP_UNSEEN: &str = r"
local tweet_id = redis.call('RPOP', KEYS[1])
while tweet_id do
    if redis.call('SADD', KEYS[2], tweet_id) == 1 then
        return tweet_id
    end
    tweet_id = redis.call('RPOP', KEYS[1])
end
return false
";

/// A fixed set of connections, handed out round-robin.
///
/// A connection that fails at the protocol level, or whose request is dropped partway
/// through (e.g., by a timeout), is discarded and replaced on its next use.
#[derive(Debug)]
pub struct RedisStore {
    cfg: config::Redis,
    slots: Vec<Mutex<Option<RedisConn>>>,
    next: AtomicUsize,
}

impl RedisStore {
    /// Open every connection in the pool up front, so that a misconfigured Redis is reported
    /// at startup.
    pub async fn connect(cfg: config::Redis) -> Result<Self> {
        let mut slots = Vec::with_capacity(*cfg.pool_size);
        for _ in 0..*cfg.pool_size {
            slots.push(Mutex::new(Some(RedisConn::new(&cfg).await?)));
        }
        log::info!("Connected to Redis at {}", cfg.addr());
        Ok(Self {
            cfg,
            slots,
            next: AtomicUsize::new(0),
        })
    }

    async fn round_trip(&self, cmds: Vec<RedisCmd>) -> Result<Vec<Reply>> {
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let mut slot = self.slots[i].lock().await;
        let mut conn = match slot.take() {
            Some(conn) => conn,
            None => {
                log::info!("Reconnecting to Redis at {}", self.cfg.addr());
                RedisConn::new(&self.cfg).await?
            }
        };

        let res = conn.send_all(cmds).await;
        match &res {
            Err(e) if e.breaks_connection() => {
                log::warn!("Dropping Redis connection #{}: {}", i, e)
            }
            _ => *slot = Some(conn),
        }
        res
    }

    async fn request(&self, cmd: RedisCmd) -> Result<Reply> {
        let reply = self
            .round_trip(vec![cmd])
            .await?
            .pop()
            .ok_or_else(|| StoreErr::InvalidRedisReply("no reply".to_string()))?;
        ok_or_reply_err(reply)
    }
}

fn ok_or_reply_err(reply: Reply) -> Result<Reply> {
    match reply {
        Reply::Error(msg) => Err(StoreErr::RedisReplyErr(msg)),
        other => Ok(other),
    }
}

fn unexpected(reply: Reply) -> StoreErr {
    StoreErr::InvalidRedisReply(format!("{:?}", reply))
}

/// Ids and set members are always written as UTF-8; anything else is a reply we can't use.
fn utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        StoreErr::InvalidRedisReply(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })
}

fn into_strings(reply: Reply) -> Result<Vec<String>> {
    reply
        .into_array()
        .map_err(unexpected)?
        .into_iter()
        .map(|el| match el {
            Reply::Bulk(Some(bytes)) => utf8(bytes),
            other => Err(unexpected(other)),
        })
        .collect()
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.request(RedisCmd::get(key))
            .await?
            .into_opt_bytes()
            .map_err(unexpected)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.request(RedisCmd::mget(keys))
            .await?
            .into_array()
            .map_err(unexpected)?
            .into_iter()
            .map(|el| el.into_opt_bytes().map_err(unexpected))
            .collect()
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        into_strings(self.request(RedisCmd::smembers(key)).await?)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        into_strings(self.request(RedisCmd::lrange(key, start, stop)).await?)
    }

    async fn pop_unseen(&self, queue: &str, seen: &str) -> Result<Option<String>> {
        self.request(RedisCmd::eval(POP_UNSEEN, &[queue, seen]))
            .await?
            .into_opt_bytes()
            .map_err(unexpected)?
            .map(utf8)
            .transpose()
    }

    /// Sends the batch wrapped in `MULTI`/`EXEC`, all in one write.
    async fn exec(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut cmds = Vec::with_capacity(batch.len() + 2);
        cmds.push(RedisCmd::multi());
        cmds.extend(batch.into_iter().map(RedisCmd::from));
        cmds.push(RedisCmd::exec());

        let mut replies = self.round_trip(cmds).await?;
        let exec_reply = replies
            .pop()
            .ok_or_else(|| StoreErr::InvalidRedisReply("no reply to EXEC".to_string()))?;
        // MULTI answers `+OK` and each queued command `+QUEUED`; any error here means Redis
        // refused the transaction.
        for reply in replies {
            ok_or_reply_err(reply)?;
        }
        match ok_or_reply_err(exec_reply)? {
            Reply::Array(Some(results)) => {
                for result in results {
                    ok_or_reply_err(result)?;
                }
                Ok(())
            }
            Reply::Array(None) => Err(StoreErr::RedisReplyErr("transaction aborted".to_string())),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod test;
