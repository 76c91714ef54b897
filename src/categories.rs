//! Static registry of harvestable categories.
//!
//! Each key maps to one category page on inshorts.com. Keys are what the
//! user types; the page slug behind a key does not always match it
//! (`india` reads `/national`, `international` reads `/world`).

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::error::HarvestError;

/// Root of every category page.
pub const BASE_URL: &str = "https://inshorts.com/en/read";

/// A registered category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    India,
    Business,
    Politics,
    Sports,
    Technology,
    Startups,
    Entertainment,
    Hatke,
    International,
    Automobile,
    Science,
    Travel,
    Miscellaneous,
}

impl Category {
    /// Every registered category, in prompt order.
    pub const ALL: [Category; 13] = [
        Category::India,
        Category::Business,
        Category::Politics,
        Category::Sports,
        Category::Technology,
        Category::Startups,
        Category::Entertainment,
        Category::Hatke,
        Category::International,
        Category::Automobile,
        Category::Science,
        Category::Travel,
        Category::Miscellaneous,
    ];

    /// The key a user selects this category with.
    pub fn key(self) -> &'static str {
        match self {
            Category::India => "india",
            Category::Business => "business",
            Category::Politics => "politics",
            Category::Sports => "sports",
            Category::Technology => "technology",
            Category::Startups => "startups",
            Category::Entertainment => "entertainment",
            Category::Hatke => "hatke",
            Category::International => "international",
            Category::Automobile => "automobile",
            Category::Science => "science",
            Category::Travel => "travel",
            Category::Miscellaneous => "miscellaneous",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Category::India => "national",
            Category::Startups => "startup",
            Category::International => "world",
            other => other.key(),
        }
    }

    /// Source page for this category.
    pub fn url(self) -> String {
        format!("{}/{}", BASE_URL, self.slug())
    }

    /// Comma-separated list of every key, for prompts and error messages.
    pub fn known_keys() -> String {
        Self::ALL.iter().map(|c| c.key()).join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| HarvestError::UnknownCategory {
                key: key.to_string(),
                known: Self::known_keys(),
            })
    }
}
