//! Reading home timelines back out of the store.
//!
//! A page is assembled in three round trips whatever its size: `LRANGE` the window of tweet
//! ids, `MGET` the tweet records, then `MGET` the distinct authors.  Tweets or authors
//! missing from the cache are skipped; the order of the timeline list is kept.
mod err;
mod reader;
mod window;

pub use err::ReadErr;
pub use reader::Reader;
pub use window::Window;
