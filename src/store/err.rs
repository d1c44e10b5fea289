use super::redis::RedisParseErr;
use std::fmt;

#[derive(Debug)]
pub enum StoreErr {
    ConnectionErr { addr: String, inner: std::io::Error },
    UnknownRedisErr(std::io::Error),
    RedisParseErr(RedisParseErr),
    RedisReplyErr(String),
    InvalidRedisReply(String),
    IncorrectPassword,
    MissingPassword,
    NotRedis(String),
    Unavailable,
}

impl StoreErr {
    pub(crate) fn with_addr<T: AsRef<str>>(address: T, inner: std::io::Error) -> Self {
        Self::ConnectionErr {
            addr: address.as_ref().to_string(),
            inner,
        }
    }

    /// Whether the connection that produced this error can no longer be trusted to line
    /// replies up with requests.
    pub(crate) fn breaks_connection(&self) -> bool {
        use StoreErr::*;
        matches!(
            self,
            ConnectionErr { .. } | UnknownRedisErr(_) | RedisParseErr(_)
        )
    }
}

impl std::error::Error for StoreErr {}

impl fmt::Display for StoreErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use StoreErr::*;
        let msg = match self {
            ConnectionErr { addr, inner } => format!(
                "Error connecting to Redis at {}.\n\
                 Connection Error: {}",
                addr, inner
            ),
            UnknownRedisErr(io_err) => {
                format!("Unexpected failure communicating with Redis: {}", io_err)
            }
            RedisParseErr(inner) => format!("Could not parse the reply from Redis: {}", inner),
            RedisReplyErr(msg) => format!("Redis returned an error: {}", msg),
            InvalidRedisReply(unexpected_reply) => format!(
                "Received an unexpected reply from Redis: `{}`",
                unexpected_reply
            ),
            IncorrectPassword => "Incorrect Redis password.  \
                                  Please supply the correct password with the REDIS_PASSWORD \
                                  environmental variable."
                .to_string(),
            MissingPassword => "Invalid authentication for Redis.  Redis is configured to require \
                                a password, but you did not provide one. \n\
                                Set a password using the REDIS_PASSWORD environmental variable."
                .to_string(),
            NotRedis(addr) => format!(
                "The server at {} is not a Redis server.  Please update the REDIS_HOST and/or \
                 REDIS_PORT environmental variables and try again.",
                addr
            ),
            Unavailable => "The store is unavailable".to_string(),
        };
        write!(f, "{}", msg)
    }
}

impl From<std::io::Error> for StoreErr {
    fn from(e: std::io::Error) -> Self {
        Self::UnknownRedisErr(e)
    }
}

impl From<RedisParseErr> for StoreErr {
    fn from(e: RedisParseErr) -> Self {
        Self::RedisParseErr(e)
    }
}
