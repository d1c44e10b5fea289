use super::cmd::RedisCmd;
use super::reply::{RedisParseErr, Reply, ReplyEnd};
use crate::config;
use crate::store::{Result, StoreErr};

use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// One authenticated, validated connection to Redis.
///
/// Requests are pipelined: every command is written before any reply is read, and replies
/// are read back in order.  A connection must not be reused after a request on it was
/// abandoned partway through, since the unread replies would be handed to the next caller.
#[derive(Debug)]
pub(crate) struct RedisConn {
    stream: TcpStream,
    addr: String,
    redis_input: Vec<u8>,
    reply_end: ReplyEnd,
}

impl RedisConn {
    pub(crate) async fn new(redis_cfg: &config::Redis) -> Result<Self> {
        let addr = redis_cfg.addr();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| StoreErr::with_addr(&addr, e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| StoreErr::with_addr(&addr, e))?;

        let mut conn = Self {
            stream,
            addr,
            redis_input: Vec::with_capacity(4096),
            reply_end: ReplyEnd::default(),
        };
        if let Some(password) = &*redis_cfg.password {
            conn.auth_connection(redis_cfg.user.as_deref(), password)
                .await?;
        }
        conn.validate_connection().await?;
        if let Some(db) = *redis_cfg.db {
            conn.select_db(db).await?;
        }
        Ok(conn)
    }

    pub(crate) async fn send(&mut self, cmd: RedisCmd) -> Result<Reply> {
        let sendable = cmd.into_sendable();
        self.stream.write_all(&sendable).await?;
        self.read_reply().await
    }

    /// Write every command at once, then read exactly one reply per command.
    pub(crate) async fn send_all(&mut self, cmds: Vec<RedisCmd>) -> Result<Vec<Reply>> {
        let n_cmds = cmds.len();
        let sendable: Vec<u8> = cmds.into_iter().flat_map(RedisCmd::into_sendable).collect();
        self.stream.write_all(&sendable).await?;

        let mut replies = Vec::with_capacity(n_cmds);
        while replies.len() < n_cmds {
            replies.push(self.read_reply().await?);
        }
        Ok(replies)
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        loop {
            if let Some(len) = self.reply_end.scan(&self.redis_input) {
                match Reply::parse(&self.redis_input[..len]) {
                    Ok((reply, leftover)) => {
                        let consumed = len - leftover.len();
                        self.redis_input.drain(..consumed);
                        return Ok(reply);
                    }
                    Err(RedisParseErr::Incomplete) => (),
                    Err(other_parse_err) => return Err(other_parse_err.into()),
                }
            }

            if self.stream.read_buf(&mut self.redis_input).await? == 0 {
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("Redis at {} closed the connection", self.addr),
                ))?
            }
        }
    }

    async fn auth_connection(&mut self, user: Option<&str>, pass: &str) -> Result<()> {
        match self.send(RedisCmd::auth(user, pass)).await? {
            Reply::Status(ok) if ok == "OK" => Ok(()),
            Reply::Error(e) if e.starts_with("WRONGPASS") || e.contains("invalid password") => {
                Err(StoreErr::IncorrectPassword)
            }
            other => Err(StoreErr::InvalidRedisReply(format!("{:?}", other))),
        }
    }

    async fn validate_connection(&mut self) -> Result<()> {
        match self.send(RedisCmd::ping()).await {
            Ok(Reply::Status(pong)) if pong == "PONG" => Ok(()),
            Ok(Reply::Error(e)) if e.starts_with("NOAUTH") => Err(StoreErr::MissingPassword),
            Ok(other) => Err(StoreErr::InvalidRedisReply(format!("{:?}", other))),
            Err(StoreErr::RedisParseErr(RedisParseErr::InvalidLineStart(_))) => {
                Err(StoreErr::NotRedis(self.addr.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn select_db(&mut self, db: u32) -> Result<()> {
        match self.send(RedisCmd::select(db)).await? {
            Reply::Status(ok) if ok == "OK" => Ok(()),
            Reply::Error(e) => Err(StoreErr::RedisReplyErr(e)),
            other => Err(StoreErr::InvalidRedisReply(format!("{:?}", other))),
        }
    }
}
