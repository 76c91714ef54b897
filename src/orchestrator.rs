//! One harvest, start to finish.
//!
//! ```text
//! category key -> PaginationDriver::expand -> ContentExtractor::extract
//!              -> PersistenceGateway::insert_all -> close
//! ```
//!
//! There is no retry and no branching beyond the short-circuit: when the
//! extractor yields nothing, nothing is written. Records reach storage only
//! through the single `insert_all` commit, so a failure anywhere earlier
//! leaves the table untouched.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::browser::SessionLauncher;
use crate::categories::Category;
use crate::config::{HarvestConfig, StorageConfig};
use crate::error::Result;
use crate::models::Record;
use crate::pagination::{ExpansionEnd, PaginationDriver};
use crate::scrapers::ContentExtractor;
use crate::storage::PersistenceGateway;
use crate::utils::truncate_for_log;

/// What one run was asked to do and how the expansion went.
#[derive(Debug, Clone)]
pub struct HarvestSession {
    pub category: Category,
    pub url: String,
    pub requested_triggers: usize,
    pub performed_triggers: usize,
    pub end: ExpansionEnd,
    pub elapsed: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Records were committed.
    Stored(usize),
    /// The page could not be read structurally; nothing was written.
    NothingExtracted,
    /// The page was readable but held no articles; nothing was written.
    NoArticles,
}

impl fmt::Display for HarvestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestOutcome::Stored(n) => write!(f, "stored {n} records"),
            HarvestOutcome::NothingExtracted => f.write_str("nothing extracted"),
            HarvestOutcome::NoArticles => f.write_str("no articles on page"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub session: HarvestSession,
    pub records: Vec<Record>,
    pub outcome: HarvestOutcome,
}

/// Sequences expansion, extraction and persistence for one category.
pub struct Harvester<L> {
    driver: PaginationDriver<L>,
    extractor: ContentExtractor,
    storage: StorageConfig,
}

impl<L: SessionLauncher> Harvester<L> {
    pub fn new(launcher: L, config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            driver: PaginationDriver::new(launcher, config.pagination.clone(), &config.layout),
            extractor: ContentExtractor::new(&config.layout)?,
            storage: config.storage.clone(),
        })
    }

    /// Harvest the category registered under `key`.
    ///
    /// An unknown key fails before any browser session or storage
    /// connection is opened.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, key: &str, max_triggers: usize) -> Result<HarvestReport> {
        let category: Category = key.parse()?;
        let url = category.url();

        // Dropping the gateway on any early return releases the connection.
        let mut gateway = PersistenceGateway::open(&self.storage)?;
        gateway.create_table()?;

        let document = self.driver.expand(&url, max_triggers).await?;
        debug!(html = %truncate_for_log(&document.html, 200), "Captured document");
        let session = HarvestSession {
            category,
            url,
            requested_triggers: max_triggers,
            performed_triggers: document.triggers,
            end: document.end,
            elapsed: document.elapsed,
        };

        let (records, outcome) = match self.extractor.extract(&document.html) {
            None => {
                warn!(%category, "Extraction failed; skipping persistence");
                (Vec::new(), HarvestOutcome::NothingExtracted)
            }
            Some(records) if records.is_empty() => {
                warn!(%category, "No articles found; skipping persistence");
                (records, HarvestOutcome::NoArticles)
            }
            Some(records) => {
                let stored = gateway.insert_all(&records)?;
                (records, HarvestOutcome::Stored(stored))
            }
        };
        gateway.close()?;

        info!(%category, %outcome, triggers = session.performed_triggers, "Harvest finished");
        Ok(HarvestReport {
            session,
            records,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FailAt, ScriptedLauncher};
    use crate::error::HarvestError;
    use crate::storage::{Column, Filter};
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><body>
        <div class="EJbGYqFfRQOwX_PmlB2H"><a href="/en/read/sports">Sports</a></div>
        <div class="TfxplVx3RtbilOD2tqd6">
          <div class="VdsPqrmJYY7F2MNUKOwQ"><span class="S2DdZEgzkqC9bYeTJUGw">Final won</span></div>
          <span class="date">12 May</span>
          <div class="Hxtmf9GvkV8Ti6V0GUSn">The home side won.</div>
          <div class="c80ZAVi5M80kecYskLY3"><a href="https://x/1">read more</a></div>
        </div>
        <div class="TfxplVx3RtbilOD2tqd6">
          <div class="VdsPqrmJYY7F2MNUKOwQ"><span class="S2DdZEgzkqC9bYeTJUGw">Record broken</span></div>
          <span class="date">12 May</span>
          <div class="Hxtmf9GvkV8Ti6V0GUSn">A new best time.</div>
        </div>
    </body></html>"#;

    fn config(dir: &TempDir) -> HarvestConfig {
        let mut config = HarvestConfig::default();
        config.pagination.throttle_ms = 0;
        config.storage = StorageConfig::new(
            dir.path().join("news.db").display().to_string(),
            "inshorts",
        );
        config
    }

    fn stored(config: &HarvestConfig) -> Vec<Record> {
        PersistenceGateway::open(&config.storage)
            .and_then(|g| {
                g.create_table()?;
                g.read_all(None)
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_stores_extracted_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let launcher = ScriptedLauncher::new(PAGE).control_lifetime(3);
        let tally = launcher.tally.clone();

        let report = Harvester::new(launcher, &config)
            .unwrap()
            .run("sports", 10)
            .await
            .unwrap();

        assert_eq!(report.outcome, HarvestOutcome::Stored(2));
        assert_eq!(report.session.category, Category::Sports);
        assert_eq!(report.session.url, "https://inshorts.com/en/read/sports");
        assert_eq!(report.session.requested_triggers, 10);
        assert_eq!(report.session.performed_triggers, 3);
        assert_eq!(report.session.end, ExpansionEnd::Exhausted);
        assert_eq!(tally.closes(), 1);

        let rows = stored(&config);
        assert_eq!(rows, report.records);
        assert_eq!(rows[0].url.as_deref(), Some("https://x/1"));
        assert_eq!(rows[1].url, None);
    }

    #[tokio::test]
    async fn test_unknown_category_never_launches_browser() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let launcher = ScriptedLauncher::new(PAGE);
        let tally = launcher.tally.clone();

        let err = Harvester::new(launcher, &config)
            .unwrap()
            .run("weather", 10)
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::UnknownCategory { .. }));
        assert_eq!(tally.launches(), 0);
        assert_eq!(tally.navigations(), 0);
        assert!(!dir.path().join("news.db").exists());
    }

    #[tokio::test]
    async fn test_missing_storage_config_fails_before_browser() {
        let launcher = ScriptedLauncher::new(PAGE);
        let tally = launcher.tally.clone();
        let mut config = HarvestConfig::default();
        config.storage.table = Some("inshorts".into());

        let err = Harvester::new(launcher, &config)
            .unwrap()
            .run("sports", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::Config(_)));
        assert_eq!(tally.launches(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let html = PAGE.replace("EJbGYqFfRQOwX_PmlB2H", "renamed-header");

        let report = Harvester::new(ScriptedLauncher::new(html), &config)
            .unwrap()
            .run("sports", 2)
            .await
            .unwrap();

        assert_eq!(report.outcome, HarvestOutcome::NothingExtracted);
        assert!(report.records.is_empty());
        assert!(stored(&config).is_empty());
    }

    #[tokio::test]
    async fn test_empty_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let html = r#"<div class="EJbGYqFfRQOwX_PmlB2H"><a href="/en/read/sports">S</a></div>"#;

        let report = Harvester::new(ScriptedLauncher::new(html), &config)
            .unwrap()
            .run("sports", 2)
            .await
            .unwrap();

        assert_eq!(report.outcome, HarvestOutcome::NoArticles);
        assert!(stored(&config).is_empty());
    }

    #[tokio::test]
    async fn test_browser_fault_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let launcher = ScriptedLauncher::new(PAGE).fail_at(FailAt::Click(2));
        let tally = launcher.tally.clone();

        let err = Harvester::new(launcher, &config)
            .unwrap()
            .run("sports", 5)
            .await
            .unwrap_err();

        assert!(matches!(err, HarvestError::Browser(_)));
        assert_eq!(tally.closes(), 1);
        assert!(stored(&config).is_empty());
    }

    #[tokio::test]
    async fn test_reruns_append() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let harvester = Harvester::new(ScriptedLauncher::new(PAGE), &config).unwrap();

        harvester.run("sports", 1).await.unwrap();
        harvester.run("sports", 1).await.unwrap();

        let gateway = PersistenceGateway::open(&config.storage).unwrap();
        let finals = gateway
            .read_all(Some(&Filter::Eq(Column::Title, "Final won".into())))
            .unwrap();
        assert_eq!(finals.len(), 2);
    }
}
