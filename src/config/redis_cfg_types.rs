use crate::from_env_var;

from_env_var!(
    /// The host where Redis is running
    let name = RedisHost;
    let default: String = "127.0.0.1".to_string();
    let (env_var, allowed_values) = ("REDIS_HOST", "a hostname or address (e.g., 127.0.0.1)");
    let from_str = |s| Some(s.to_string());
);
from_env_var!(
    /// The port Redis is running on
    let name = RedisPort;
    let default: u16 = 6379;
    let (env_var, allowed_values) = ("REDIS_PORT", "a number between 0 and 65535");
    let from_str = |s| s.parse().ok();
);
from_env_var!(
    /// The user to authenticate as, for Redis servers with ACLs
    let name = RedisUser;
    let default: Option<String> = None;
    let (env_var, allowed_values) = ("REDIS_USER", "any string");
    let from_str = |s| Some(Some(s.to_string()));
);
from_env_var!(
    /// The password to use for Redis
    let name = RedisPass;
    let default: Option<String> = None;
    let (env_var, allowed_values) = ("REDIS_PASSWORD", "any string");
    let from_str = |s| Some(Some(s.to_string()));
);
from_env_var!(
    /// The Redis database to `SELECT` after connecting
    let name = RedisDb;
    let default: Option<u32> = None;
    let (env_var, allowed_values) = ("REDIS_DB", "a database number (e.g., 0)");
    let from_str = |s| s.parse().ok().map(Some);
);
from_env_var!(
    /// A prefix for every key, shared with the services writing into the same Redis
    let name = RedisNamespace;
    let default: Option<String> = None;
    let (env_var, allowed_values) = ("REDIS_NAMESPACE", "any string");
    let from_str = |s| Some(Some(s.to_string()));
);
from_env_var!(
    /// How many connections to keep open to Redis
    let name = RedisPoolSize;
    let default: usize = 4;
    let (env_var, allowed_values) = ("REDIS_POOL_SIZE", "a positive number");
    let from_str = |s| s.parse().ok().filter(|n: &usize| *n > 0);
);
