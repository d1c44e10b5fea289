use super::deployment_cfg_types::*;
use super::EnvVar;
use crate::err::FatalErr;

#[derive(Debug, Default, Clone)]
pub struct Deployment {
    pub env: Env,
    pub address: BindAddr,
    pub port: Port,
}

impl Deployment {
    pub(crate) fn from_env(env: EnvVar) -> Result<Self, FatalErr> {
        let node_env = NodeEnv::default().maybe_update(env.get("NODE_ENV"))?;
        let cfg = Self {
            env: Env(*node_env).maybe_update(env.get("RUST_ENV"))?,
            address: BindAddr::default().maybe_update(env.get("BIND"))?,
            port: Port::default().maybe_update(env.get("PORT"))?,
        };
        log::info!("Using deployment configuration:\n {:#?}", &cfg);
        Ok(cfg)
    }

    pub fn is_production(&self) -> bool {
        *self.env == EnvInner::Production
    }
}
