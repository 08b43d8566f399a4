use serde::Deserialize;

/// GitHub issue search response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A single issue or pull request in a search response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    pub html_url: String,
    pub title: String,
    pub number: u64,
}

impl Item {
    pub fn new(number: u64, title: impl Into<String>, html_url: impl Into<String>) -> Self {
        Self {
            html_url: html_url.into(),
            title: title.into(),
            number,
        }
    }
}

impl SearchResult {
    pub fn new(total_count: u64, items: Vec<Item>) -> Self {
        Self { total_count, items }
    }
}
