//! Structural extraction of article records from expanded pages.
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | Inshorts category pages | [`inshorts`] | One card per article, category from the page header |

pub mod inshorts;

pub use inshorts::ContentExtractor;
