use crate::from_env_var;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use strum::{EnumString, VariantNames};

from_env_var!(
    /// The current environment, which controls what file to read other ENV vars from
    let name = Env;
    let default: EnvInner = EnvInner::Development;
    let (env_var, allowed_values) = ("RUST_ENV", format!("one of: {:?}", EnvInner::VARIANTS));
    let from_str = |s| EnvInner::from_str(s).ok();
);
from_env_var!(
    /// The environment as the other services name it; `RUST_ENV` wins when both are set
    let name = NodeEnv;
    let default: EnvInner = EnvInner::Development;
    let (env_var, allowed_values) = ("NODE_ENV", format!("one of: {:?}", EnvInner::VARIANTS));
    let from_str = |s| EnvInner::from_str(s).ok();
);
#[derive(EnumString, VariantNames, Debug, Clone, Copy, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum EnvInner {
    Production,
    Development,
}

from_env_var!(
    /// The address to serve timeline reads on
    let name = BindAddr;
    let default: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let (env_var, allowed_values) = ("BIND", "a valid address (e.g., 127.0.0.1)");
    let from_str = |s| match s {
        "localhost" => Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        _ => s.parse().ok(),
    };
);
from_env_var!(
    /// The port to serve timeline reads on
    let name = Port;
    let default: u16 = 4000;
    let (env_var, allowed_values) = ("PORT", "a number between 0 and 65535");
    let from_str = |s| s.parse().ok();
);
