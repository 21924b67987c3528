//! Wire types shared by the library API and the aggregation code.

use serde::{Deserialize, Serialize};

/// A catalog entry as returned by the library API.
///
/// Only `title` and `category` matter to loan statistics; the rest is
/// carried for the browse surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub publish_year: Option<i32>,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub available_copies: u32,
    #[serde(default)]
    pub total_copies: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Book {
    /// Build a book with just the fields the aggregator reads.
    pub fn new(id: i64, title: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            id,
            title: title.into(),
            author: String::new(),
            category: category.map(str::to_string),
            publish_year: None,
            publisher: String::new(),
            available_copies: 0,
            total_copies: 0,
            image_url: None,
        }
    }

    /// The category label, or `None` when absent or empty.
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether at least one copy can be borrowed right now.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// A historical loan. Only the borrowed title is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub title: String,
}

impl LoanRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}
