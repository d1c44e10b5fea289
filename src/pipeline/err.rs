use crate::record::CorruptRecord;
use crate::store::StoreErr;

use std::fmt;
use std::time::Duration;

/// Why the fan-out of one tweet was abandoned.
#[derive(Debug)]
pub enum FanoutErr {
    TweetNotFound(String),
    CorruptRecord(CorruptRecord),
    Store(StoreErr),
    Timeout(Duration),
}

impl std::error::Error for FanoutErr {}

impl fmt::Display for FanoutErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use FanoutErr::*;
        match self {
            TweetNotFound(key) => write!(f, "no tweet record at `{}`", key),
            CorruptRecord(inner) => write!(f, "{}", inner),
            Store(inner) => write!(f, "{}", inner),
            Timeout(after) => write!(
                f,
                "timeline writes were not acknowledged within {}ms",
                after.as_millis()
            ),
        }?;
        Ok(())
    }
}

impl From<StoreErr> for FanoutErr {
    fn from(e: StoreErr) -> Self {
        Self::Store(e)
    }
}

impl From<CorruptRecord> for FanoutErr {
    fn from(e: CorruptRecord) -> Self {
        Self::CorruptRecord(e)
    }
}
