/// One write inside a [`Batch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set { key: String, value: String },
    LPush { key: String, value: String },
    LTrim { key: String, start: i64, stop: i64 },
}

/// Writes submitted to the store together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch(Vec<Write>);

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }

    pub fn set(&mut self, key: String, value: String) -> &mut Self {
        self.0.push(Write::Set { key, value });
        self
    }

    pub fn lpush(&mut self, key: String, value: String) -> &mut Self {
        self.0.push(Write::LPush { key, value });
        self
    }

    pub fn ltrim(&mut self, key: String, start: i64, stop: i64) -> &mut Self {
        self.0.push(Write::LTrim { key, start, stop });
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Write> {
        self.0.iter()
    }
}

impl IntoIterator for Batch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
