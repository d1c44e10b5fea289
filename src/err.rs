use crate::store::StoreErr;
use std::fmt;

/// Errors that stop the process at startup.
///
/// Once the pipeline and the read server are running nothing is fatal: per-item and
/// per-request failures are logged or returned to the caller instead.
pub enum FatalErr {
    Store(StoreErr),
    Logger(log::SetLoggerError),
    StdIo(std::io::Error),
    Dotenv(dotenv::Error),
    Bind(std::net::SocketAddr, warp::Error),
    // config errs
    UrlParse(url::ParseError),
    ConfigErr(String),
}

impl FatalErr {
    pub fn config(
        var: impl fmt::Display,
        value: impl fmt::Display,
        allowed: impl fmt::Display,
    ) -> Self {
        Self::ConfigErr(format!(
            "{0} is set to `{1}`, which is invalid.\n{3:7}{0} must be {2}.",
            var, value, allowed, ""
        ))
    }
}

impl std::error::Error for FatalErr {}
impl fmt::Debug for FatalErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

impl fmt::Display for FatalErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use FatalErr::*;
        write!(
            f,
            "{}",
            match self {
                Store(e) => format!("could not connect to Redis.\n{:7}{}", "", e),
                Logger(e) => format!("{}", e),
                StdIo(e) => format!("{}", e),
                Dotenv(e) => format!("could not read the `.env` file.\n{:7}{}", "", e),
                Bind(addr, e) => format!("could not listen on {}.\n{:7}{}", addr, "", e),
                UrlParse(e) => format!("could not parse REDIS_URL.\n{:7}{}", "", e),
                ConfigErr(e) => e.to_string(),
            }
        )
    }
}

impl From<StoreErr> for FatalErr {
    fn from(e: StoreErr) -> Self {
        Self::Store(e)
    }
}
impl From<log::SetLoggerError> for FatalErr {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Logger(e)
    }
}
impl From<std::io::Error> for FatalErr {
    fn from(e: std::io::Error) -> Self {
        Self::StdIo(e)
    }
}
impl From<dotenv::Error> for FatalErr {
    fn from(e: dotenv::Error) -> Self {
        Self::Dotenv(e)
    }
}
impl From<url::ParseError> for FatalErr {
    fn from(e: url::ParseError) -> Self {
        Self::UrlParse(e)
    }
}
