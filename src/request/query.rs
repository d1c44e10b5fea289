//! Query parameters, with the defaults readers get when they leave them out.
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    #[serde(default = "Page::first")]
    pub page: usize,
    #[serde(default = "Page::default_size")]
    pub size: usize,
}

impl Page {
    fn first() -> usize {
        1
    }
    fn default_size() -> usize {
        10
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset {
    #[serde(default = "Offset::default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

impl Offset {
    fn default_limit() -> usize {
        10
    }
}
