//! Configuration, read from environmental variables (optionally merged from a `.env` file).
//!
//! Every setting has a default; setting the variable of the same name overrides it.  An
//! invalid value is a fatal error that names the variable and the values it accepts.
pub use {deployment_cfg::Deployment, pipeline_cfg::Pipeline, redis_cfg::Redis};

pub(crate) use self::environmental_variables::EnvVar;
use crate::err::FatalErr;

use hashbrown::HashMap;
use std::{env, io};

mod deployment_cfg;
mod deployment_cfg_types;
mod environmental_variables;
mod pipeline_cfg;
mod pipeline_cfg_types;
mod redis_cfg;
mod redis_cfg_types;

pub use deployment_cfg_types::EnvInner;
pub use pipeline_cfg_types::{
    FanoutTimeout, PollEmptyBackoff, PollErrBackoff, QueueCapacity, ReadTimeout, TimelineMaxLen,
    Workers,
};

pub fn merge_dotenv() -> Result<(), FatalErr> {
    let env_file = match env::var("ENV").ok().as_deref() {
        Some("production") => ".env.production",
        Some("development") | None => ".env",
        Some(unsupported) => Err(FatalErr::config(
            "ENV",
            unsupported,
            "`production` or `development`",
        ))?,
    };

    match dotenv::from_filename(env_file) {
        Ok(_) => Ok(()),
        // Running without a `.env` file is fine; the environment is used as-is
        Err(dotenv::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub fn from_env(
    env_vars: HashMap<String, String>,
) -> Result<(Redis, Deployment, Pipeline), FatalErr> {
    let env_vars = EnvVar::new(env_vars);
    log::info!("Environmental variables received: {}", &env_vars);
    Ok((
        Redis::from_env(env_vars.clone())?,
        Deployment::from_env(env_vars.clone())?,
        Pipeline::from_env(env_vars)?,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_env() -> Result<(), FatalErr> {
        let (redis, deployment, pipeline) = from_env(HashMap::new())?;

        assert_eq!(redis.addr(), "127.0.0.1:6379");
        assert_eq!(*redis.namespace, None);
        assert_eq!(*deployment.port, 4000);
        assert!(!deployment.is_production());
        assert_eq!(*pipeline.workers, 5);
        assert_eq!(*pipeline.queue_capacity, 100);
        assert_eq!(*pipeline.poll_err_backoff, Duration::from_secs(1));
        assert_eq!(*pipeline.poll_empty_backoff, Duration::from_secs(2));
        assert_eq!(pipeline.max_len(), None);
        Ok(())
    }

    #[test]
    fn env_overrides_defaults() -> Result<(), FatalErr> {
        let (redis, deployment, pipeline) = from_env(vars(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_NAMESPACE", "staging"),
            ("RUST_ENV", "production"),
            ("WORKERS", "12"),
            ("POLL_EMPTY_BACKOFF", "250"),
            ("TIMELINE_MAX_LEN", "800"),
        ]))?;

        assert_eq!(redis.addr(), "cache.internal:6379");
        assert_eq!(redis.namespace.as_deref(), Some("staging"));
        assert!(deployment.is_production());
        assert_eq!(*pipeline.workers, 12);
        assert_eq!(*pipeline.poll_empty_backoff, Duration::from_millis(250));
        assert_eq!(pipeline.max_len(), Some(800));
        Ok(())
    }

    #[test]
    fn rust_env_wins_over_node_env() -> Result<(), FatalErr> {
        let (_, deployment, _) = from_env(vars(&[("NODE_ENV", "production")]))?;
        assert!(deployment.is_production());

        let (_, deployment, _) = from_env(vars(&[
            ("NODE_ENV", "production"),
            ("RUST_ENV", "development"),
        ]))?;
        assert!(!deployment.is_production());
        Ok(())
    }

    #[test]
    fn redis_url_wins_over_parts() -> Result<(), FatalErr> {
        let (redis, _, _) = from_env(vars(&[
            ("REDIS_HOST", "ignored"),
            ("REDIS_URL", "redis://:secret@cache:6390/2"),
        ]))?;

        assert_eq!(redis.addr(), "cache:6390");
        assert_eq!(redis.password.as_deref(), Some("secret"));
        assert_eq!(*redis.db, Some(2));
        Ok(())
    }

    #[test]
    fn empty_value_means_default() -> Result<(), FatalErr> {
        let (_, _, pipeline) = from_env(vars(&[("WORKERS", "")]))?;
        assert_eq!(*pipeline.workers, 5);
        Ok(())
    }

    #[test]
    fn invalid_values_are_fatal() {
        for (var, value) in &[
            ("WORKERS", "0"),
            ("WORKERS", "many"),
            ("REDIS_PORT", "70000"),
            ("RUST_ENV", "staging"),
            ("NODE_ENV", "staging"),
            ("FANOUT_TIMEOUT", "0"),
        ] {
            match from_env(vars(&[(*var, *value)])) {
                Err(FatalErr::ConfigErr(msg)) => assert!(msg.contains(var), "{}", msg),
                other => panic!(
                    "{}={} should be rejected, got {:?}",
                    var,
                    value,
                    other.map(|_| ())
                ),
            }
        }
    }
}
