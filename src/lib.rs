//! # Inshorts Harvester
//!
//! Harvests short news summaries from an inshorts.com category page that
//! only reveals more articles after repeated "load more" clicks, turns the
//! expanded markup into [`models::Record`]s and appends them to SQLite.
//!
//! ## Architecture
//!
//! A run is a straight line, driven by [`orchestrator::Harvester`]:
//! 1. **Expansion**: [`pagination::PaginationDriver`] opens a headless
//!    browser, clicks "load more" up to a budget and captures the document
//! 2. **Extraction**: [`scrapers::ContentExtractor`] reads one record per
//!    article container
//! 3. **Persistence**: [`storage::PersistenceGateway`] commits the batch in
//!    one transaction
//!
//! CSV/JSON snapshots ([`outputs`]) are written by the binary from the
//! returned report.

pub mod browser;
pub mod categories;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod outputs;
pub mod pagination;
pub mod scrapers;
pub mod storage;
pub mod utils;
