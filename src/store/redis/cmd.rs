use crate::store::Write;

/// A command ready to be encoded as a RESP array of bulk strings.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RedisCmd(Vec<String>);

impl RedisCmd {
    fn new(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    fn arg(mut self, arg: impl ToString) -> Self {
        self.0.push(arg.to_string());
        self
    }

    fn args<I: IntoIterator<Item = T>, T: ToString>(mut self, args: I) -> Self {
        self.0.extend(args.into_iter().map(|arg| arg.to_string()));
        self
    }

    pub(crate) fn ping() -> Self {
        Self::new("PING")
    }

    pub(crate) fn auth(user: Option<&str>, pass: &str) -> Self {
        Self::new("AUTH").args(user).arg(pass)
    }

    pub(crate) fn select(db: u32) -> Self {
        Self::new("SELECT").arg(db)
    }

    pub(crate) fn get(key: &str) -> Self {
        Self::new("GET").arg(key)
    }

    pub(crate) fn mget(keys: &[String]) -> Self {
        Self::new("MGET").args(keys)
    }

    pub(crate) fn smembers(key: &str) -> Self {
        Self::new("SMEMBERS").arg(key)
    }

    pub(crate) fn lrange(key: &str, start: i64, stop: i64) -> Self {
        Self::new("LRANGE").arg(key).arg(start).arg(stop)
    }

    pub(crate) fn eval(script: &str, keys: &[&str]) -> Self {
        Self::new("EVAL").arg(script).arg(keys.len()).args(keys)
    }

    pub(crate) fn multi() -> Self {
        Self::new("MULTI")
    }

    pub(crate) fn exec() -> Self {
        Self::new("EXEC")
    }

    /// `*[N_ARGS]\r\n` followed by `$[LEN]\r\n[ARG]\r\n` for each argument.
    pub(crate) fn into_sendable(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16 + self.0.iter().map(|a| a.len() + 16).sum::<usize>());
        out.extend_from_slice(&[b"*", self.0.len().to_string().as_bytes(), b"\r\n"].concat());
        for arg in &self.0 {
            out.extend_from_slice(
                &[
                    b"$",
                    arg.len().to_string().as_bytes(),
                    b"\r\n",
                    arg.as_bytes(),
                    b"\r\n",
                ]
                .concat(),
            );
        }
        out
    }
}

impl From<Write> for RedisCmd {
    fn from(write: Write) -> Self {
        match write {
            Write::Set { key, value } => Self::new("SET").arg(key).arg(value),
            Write::LPush { key, value } => Self::new("LPUSH").arg(key).arg(value),
            Write::LTrim { key, start, stop } => Self::new("LTRIM").arg(key).arg(start).arg(stop),
        }
    }
}
