use super::ReadErr;

/// An inclusive range of positions in a timeline list, newest entry at position 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: usize,
    len: usize,
}

impl Window {
    /// The `page`th run of `size` entries; pages count from 1.
    pub fn page(page: usize, size: usize) -> Result<Self, ReadErr> {
        let start = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(size))
            .ok_or(ReadErr::InvalidPage(page))?;
        Ok(Self { start, len: size })
    }

    /// `limit` entries, skipping the first `offset`.
    pub fn offset(limit: usize, offset: usize) -> Self {
        Self {
            start: offset,
            len: limit,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> i64 {
        clamp(self.start)
    }

    /// The last position in the window.  Meaningless for an empty window, which must not
    /// be passed to `LRANGE` (`stop` would fall before `start`, or to -1 for "the end").
    pub fn stop(&self) -> i64 {
        clamp(self.start.saturating_add(self.len).saturating_sub(1))
    }
}

fn clamp(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
