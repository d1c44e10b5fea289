use std::{error::Error, fmt};

#[derive(Debug)]
pub enum RedisParseErr {
    Incomplete,
    InvalidNumber(std::num::ParseIntError),
    NegativeLength(i64),
    InvalidLineStart(String),
    InvalidLineEnd,
    NonUtf8,
}

impl fmt::Display for RedisParseErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        use RedisParseErr::*;
        let msg = match self {
            Incomplete => "The input from Redis does not form a complete reply, likely because \
                           the input buffer filled partway through a reply.  Save this input \
                           and try again with additional input from Redis."
                .to_string(),
            InvalidNumber(parse_int_err) => format!(
                "Redis indicated that an item would be a number, but it could not be parsed: {}",
                parse_int_err
            ),
            NegativeLength(len) => format!("Redis sent an invalid length of {}", len),
            InvalidLineStart(line_start_char) => format!(
                "A line from Redis started with `{}`, which is not a valid character to indicate \
                 the type of the Redis line.",
                line_start_char
            ),
            InvalidLineEnd => "A Redis line ended before expected line length".to_string(),
            NonUtf8 => "Redis sent a string that is not valid UTF-8".to_string(),
        };
        write!(f, "{}", msg)
    }
}

impl Error for RedisParseErr {}

impl From<std::num::ParseIntError> for RedisParseErr {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::InvalidNumber(error)
    }
}
