use crate::err::FatalErr;

use hashbrown::HashMap;
use std::fmt;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) struct EnvVar(pub HashMap<String, String>);
impl std::ops::Deref for EnvVar {
    type Target = HashMap<String, String>;
    fn deref(&self) -> &HashMap<String, String> {
        &self.0
    }
}

impl EnvVar {
    pub(crate) fn new(vars: HashMap<String, String>) -> Self {
        Self(vars)
    }

    pub(crate) fn maybe_add_env_var(&mut self, key: &str, maybe_value: Option<impl ToString>) {
        if let Some(value) = maybe_value {
            self.0.insert(key.to_string(), value.to_string());
        }
    }

    /// Split a `REDIS_URL` into the individual `REDIS_*` variables it stands for.  Values from
    /// the URL win over separately-set variables.
    pub(crate) fn update_with_url(mut self, url_str: &str) -> Result<Self, FatalErr> {
        let url = Url::parse(url_str)?;
        let none_if_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        self.maybe_add_env_var("REDIS_HOST", url.host_str());
        self.maybe_add_env_var("REDIS_PORT", url.port());
        self.maybe_add_env_var("REDIS_USER", none_if_empty(url.username()));
        self.maybe_add_env_var("REDIS_PASSWORD", url.password());
        self.maybe_add_env_var(
            "REDIS_DB",
            none_if_empty(url.path().trim_start_matches('/')),
        );
        Ok(self)
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = String::new();
        for env_var in &[
            "ENV",
            "NODE_ENV",
            "RUST_ENV",
            "RUST_LOG",
            "BIND",
            "PORT",
            "REDIS_URL",
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_USER",
            "REDIS_DB",
            "REDIS_NAMESPACE",
            "REDIS_POOL_SIZE",
            "WORKERS",
            "QUEUE_CAPACITY",
            "POLL_ERR_BACKOFF",
            "POLL_EMPTY_BACKOFF",
            "FANOUT_TIMEOUT",
            "READ_TIMEOUT",
            "TIMELINE_MAX_LEN",
        ] {
            if let Some(value) = self.get(*env_var) {
                result = format!("{}\n    {}: {}", result, env_var, value)
            }
        }
        if self.contains_key("REDIS_PASSWORD") {
            result = format!("{}\n    REDIS_PASSWORD: ********", result)
        }
        write!(f, "{}", result)
    }
}

#[macro_export]
macro_rules! from_env_var {
    ($(#[$outer:meta])*
     let name = $name:ident;
     let default: $type:ty = $inner:expr;
     let (env_var, allowed_values) = ($env_var:tt, $allowed_values:expr);
     let from_str = |$arg:ident| $body:expr;
    ) => {
        $(#[$outer])*
        #[derive(Clone)]
        pub struct $name(pub $type);
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self.0)
            }
        }
        impl std::ops::Deref for $name {
            type Target = $type;
            fn deref(&self) -> &$type {
                &self.0
            }
        }
        impl std::default::Default for $name {
            fn default() -> Self {
                $name($inner)
            }
        }
        impl $name {
            fn inner_from_str($arg: &str) -> Option<$type> {
                $body
            }
            pub(crate) fn maybe_update(
                self,
                var: Option<&String>,
            ) -> Result<Self, $crate::err::FatalErr> {
                Ok(match var {
                    Some(empty_string) if empty_string.is_empty() => Self::default(),
                    Some(value) => Self(Self::inner_from_str(value).ok_or_else(|| {
                        $crate::err::FatalErr::config($env_var, value, $allowed_values)
                    })?),
                    None => self,
                })
            }
        }
    };
}
