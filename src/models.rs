//! Data model for harvested articles.
//!
//! A [`Record`] is one article summary lifted from an expanded category page.
//! Serialized field names (`titles`, `descriptions`, `urls`) follow the
//! stored column names so that CSV, JSON and SQLite all share one layout.

use serde::{Deserialize, Serialize};

/// A normalized article summary.
///
/// All four per-article fields come from the same article container. The
/// `category` is shared by every record of one harvest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Record {
    /// Category label derived from the page-level category marker.
    pub category: String,
    /// Article headline, never blank.
    #[serde(rename = "titles")]
    pub title: String,
    /// Display date exactly as the page renders it. Empty when the page shows none.
    pub date: String,
    /// Short summary body, never blank.
    #[serde(rename = "descriptions")]
    pub description: String,
    /// Link target of the article's anchor, `None` when the anchor is missing.
    #[serde(rename = "urls")]
    pub url: Option<String>,
}

impl Record {
    /// Build a record, trimming every text field.
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            category: category.into().trim().to_string(),
            title: title.into().trim().to_string(),
            date: date.into().trim().to_string(),
            description: description.into().trim().to_string(),
            url,
        }
    }
}
