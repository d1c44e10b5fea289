use super::redis_cfg_types::*;
use super::EnvVar;
use crate::err::FatalErr;

#[derive(Debug, Default, Clone)]
pub struct Redis {
    pub user: RedisUser,
    pub password: RedisPass,
    pub port: RedisPort,
    pub host: RedisHost,
    pub db: RedisDb,
    pub namespace: RedisNamespace,
    pub pool_size: RedisPoolSize,
}

impl Redis {
    const PASSWORDLESS_USER_WARNING: &'static str =
        "Redis user specified without a password.  Ignoring it.";

    pub(crate) fn from_env(env: EnvVar) -> Result<Self, FatalErr> {
        let env = match env.get("REDIS_URL").cloned() {
            Some(url_str) => env.update_with_url(&url_str)?,
            None => env,
        };

        let cfg = Redis {
            user: RedisUser::default().maybe_update(env.get("REDIS_USER"))?,
            password: RedisPass::default().maybe_update(env.get("REDIS_PASSWORD"))?,
            port: RedisPort::default().maybe_update(env.get("REDIS_PORT"))?,
            host: RedisHost::default().maybe_update(env.get("REDIS_HOST"))?,
            db: RedisDb::default().maybe_update(env.get("REDIS_DB"))?,
            namespace: RedisNamespace::default().maybe_update(env.get("REDIS_NAMESPACE"))?,
            pool_size: RedisPoolSize::default().maybe_update(env.get("REDIS_POOL_SIZE"))?,
        };

        if cfg.user.is_some() && cfg.password.is_none() {
            log::warn!("{}", Self::PASSWORDLESS_USER_WARNING);
        }
        log::info!(
            "Redis configuration: {}:{} (db {:?}, namespace {:?}, {} connections)",
            *cfg.host,
            *cfg.port,
            *cfg.db,
            *cfg.namespace,
            *cfg.pool_size
        );
        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        [&*self.host, ":", &self.port.to_string()].concat()
    }
}
