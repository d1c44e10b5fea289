use crate::record::CorruptRecord;
use crate::store::StoreErr;

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ReadErr {
    Store(StoreErr),
    CorruptRecord(CorruptRecord),
    InvalidPage(usize),
    Timeout(Duration),
}

impl ReadErr {
    /// Whether the caller, not the store, is at fault.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ReadErr::InvalidPage(_))
    }
}

impl std::error::Error for ReadErr {}

impl fmt::Display for ReadErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use ReadErr::*;
        match self {
            Store(inner) => write!(f, "error retrieving timeline: {}", inner),
            CorruptRecord(inner) => write!(f, "{}", inner),
            InvalidPage(page) => write!(f, "page {} does not exist; pages start at 1", page),
            Timeout(after) => write!(
                f,
                "timeline could not be read within {}ms",
                after.as_millis()
            ),
        }?;
        Ok(())
    }
}

impl From<StoreErr> for ReadErr {
    fn from(e: StoreErr) -> Self {
        Self::Store(e)
    }
}

impl From<CorruptRecord> for ReadErr {
    fn from(e: CorruptRecord) -> Self {
        Self::CorruptRecord(e)
    }
}
