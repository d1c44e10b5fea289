//! Methods for parsing replies in the subset of the Redis Serialization Protocol we use.
//!
//! Each reply starts with a one-byte type marker and ends with `\r\n`.  A reply to
//! `MGET tweets:1 tweets:2`, where only the first key exists, looks like this (with line
//! breaks added after each `\r\n`):
//!
//! ```text
//! *2\r\n
//! $25\r\n
//! {"id":"1","content":"hi"}\r\n
//! $-1\r\n
//! ```
//!
//! Read that as: an array with two elements, a bulk string of twenty-five bytes and a null
//! bulk string.  See the [Redis protocol documentation](https://redis.io/topics/protocol)
//! for details.
mod err;
pub use err::RedisParseErr;

use std::str;

/// A fully parsed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Status(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Vec<u8>>),
    Array(Option<Vec<Reply>>),
}

use RedisParseErr::*;
use Reply::*;
type RedisParser<'a, Item> = Result<Item, RedisParseErr>;

impl Reply {
    /// Parse one reply from the front of `input`, returning it with the unparsed remainder.
    ///
    /// Input that ends partway through a reply yields [`RedisParseErr::Incomplete`]; read
    /// more and try again with the same (extended) input.
    pub fn parse(input: &[u8]) -> RedisParser<(Reply, &[u8])> {
        let (first_byte, rest) = input.split_first().ok_or(Incomplete)?;
        match first_byte {
            b'+' => line_at(rest).and_then(|(line, rest)| Ok((Status(utf8(line)?), rest))),
            b'-' => line_at(rest).and_then(|(line, rest)| Ok((Error(utf8(line)?), rest))),
            b':' => parse_number_at(rest).map(|(n, rest)| (Integer(n), rest)),
            b'$' => parse_redis_bulk_string(rest),
            b'*' => parse_redis_array(rest),
            other => Err(InvalidLineStart((*other as char).to_string())),
        }
    }

    /// The raw payload of a bulk string, or `None` for a null bulk string.
    /// Payloads are not checked for UTF-8; see [`crate::record::decode`].
    pub fn into_opt_bytes(self) -> Result<Option<Vec<u8>>, Reply> {
        match self {
            Bulk(bytes) => Ok(bytes),
            other => Err(other),
        }
    }

    /// The elements of an array reply (a null array is empty).
    pub fn into_array(self) -> Result<Vec<Reply>, Reply> {
        match self {
            Array(elements) => Ok(elements.unwrap_or_default()),
            other => Err(other),
        }
    }
}

/// Finds where the first reply in a growing buffer ends.
///
/// Scanning resumes where the previous call stopped, so a large reply that arrives over many
/// reads is walked once rather than re-parsed from its first byte after every read.  Only
/// the framing is checked; malformed input is reported as complete for [`Reply::parse`] to
/// reject.
#[derive(Debug, Default)]
pub(crate) struct ReplyEnd {
    pos: usize,
    owed: usize,
}

impl ReplyEnd {
    /// The length of the first reply in `input`, or `None` until all of it has arrived.
    ///
    /// `input` must only grow between calls that return `None`.
    pub(crate) fn scan(&mut self, input: &[u8]) -> Option<usize> {
        if self.owed == 0 {
            self.pos = 0;
            self.owed = 1;
        }
        while self.owed > 0 {
            let (first_byte, rest) = input.get(self.pos..)?.split_first()?;
            let (line, _) = line_at(rest).ok()?;
            let mut next = self.pos + 1 + line.len() + "\r\n".len();
            match (*first_byte, declared_len(line)) {
                (b'+', _) | (b'-', _) | (b':', _) => (),
                (b'$', Some(len)) => {
                    if len >= 0 {
                        next += len as usize + "\r\n".len();
                        if input.len() < next {
                            return None;
                        }
                    }
                }
                (b'*', Some(n)) => self.owed += n.max(0) as usize,
                _ => {
                    self.owed = 0;
                    return Some(input.len());
                }
            }
            self.owed -= 1;
            self.pos = next;
        }
        Some(self.pos)
    }
}

fn declared_len(line: &[u8]) -> Option<i64> {
    str::from_utf8(line).ok()?.parse().ok()
}

fn utf8(bytes: &[u8]) -> RedisParser<String> {
    str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| NonUtf8)
}

/// Split off one `\r\n`-terminated line.
fn line_at(s: &[u8]) -> RedisParser<(&[u8], &[u8])> {
    let end = s.windows(2).position(|w| w == b"\r\n").ok_or(Incomplete)?;
    Ok((&s[..end], &s[end + "\r\n".len()..]))
}

fn parse_number_at(s: &[u8]) -> RedisParser<(i64, &[u8])> {
    let (line, rest) = line_at(s)?;
    Ok((utf8(line)?.parse()?, rest))
}

/// Parse a Redis bulk string and return the content of that string and the unparsed remainder.
///
/// All bulk strings have the format `$[LENGTH_OF_ITEM_BODY]\r\n[ITEM_BODY]\r\n`, except the
/// null bulk string, `$-1\r\n`.
fn parse_redis_bulk_string(s: &[u8]) -> RedisParser<(Reply, &[u8])> {
    let (len, rest) = parse_number_at(s)?;
    let len = match len {
        -1 => return Ok((Bulk(None), rest)),
        len if len < 0 => Err(NegativeLength(len))?,
        len => len as usize,
    };
    let content = rest.get(..len).ok_or(Incomplete)?;
    let after = &rest[len..];
    match after.get(.."\r\n".len()) {
        None => Err(Incomplete),
        Some(b"\r\n") => Ok((Bulk(Some(content.to_vec())), &after["\r\n".len()..])),
        Some(_) => Err(InvalidLineEnd),
    }
}

fn parse_redis_array(s: &[u8]) -> RedisParser<(Reply, &[u8])> {
    let (number_of_elements, mut rest) = parse_number_at(s)?;
    let number_of_elements = match number_of_elements {
        -1 => return Ok((Array(None), rest)),
        n if n < 0 => Err(NegativeLength(n))?,
        n => n as usize,
    };

    let mut inner = Vec::with_capacity(number_of_elements.min(1024));
    for _ in 0..number_of_elements {
        let (next_el, new_rest) = Reply::parse(rest)?;
        rest = new_rest;
        inner.push(next_el);
    }
    Ok((Array(Some(inner)), rest))
}
