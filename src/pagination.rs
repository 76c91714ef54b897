//! Incremental content expansion.
//!
//! The category page shows a first batch of articles and reveals more each
//! time its "load more" control is activated. [`PaginationDriver::expand`]
//! opens a fresh session, activates the control up to a fixed budget, and
//! captures the resulting document.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> Navigated -> Expanding(1..n) -> { Exhausted | BudgetReached } -> Closed
//!                  \________________ any fault ________________________/-> Aborted
//! ```
//!
//! The session is closed on every path out of [`PaginationDriver::expand`].

use std::fmt;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::browser::{PageSession, SessionLauncher};
use crate::config::{PageLayout, PaginationConfig};
use crate::error::Result;

/// Why the trigger loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionEnd {
    /// The control disappeared: the page has nothing more to show.
    Exhausted,
    /// The trigger budget was spent while the control was still present.
    BudgetReached,
}

impl fmt::Display for ExpansionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionEnd::Exhausted => f.write_str("exhausted"),
            ExpansionEnd::BudgetReached => f.write_str("budget reached"),
        }
    }
}

/// The page markup after expansion, plus how it got there.
#[derive(Debug, Clone)]
pub struct ExpandedDocument {
    pub url: String,
    pub html: String,
    /// Successful control activations.
    pub triggers: usize,
    pub end: ExpansionEnd,
    /// Wall-clock time spent in the trigger loop.
    pub elapsed: Duration,
}

/// Drives a browser through repeated "load more" activations.
pub struct PaginationDriver<L> {
    launcher: L,
    config: PaginationConfig,
    ready_selector: String,
    control_selector: String,
}

impl<L: SessionLauncher> PaginationDriver<L> {
    pub fn new(launcher: L, config: PaginationConfig, layout: &PageLayout) -> Self {
        Self {
            launcher,
            config,
            ready_selector: layout.article_container.clone(),
            control_selector: layout.load_more.clone(),
        }
    }

    /// Expand `url` with at most `max_triggers` control activations.
    ///
    /// Nothing is clicked until the first article container is visible. The
    /// loop ends early, without error, once the control is no longer found.
    ///
    /// # Arguments
    ///
    /// * `url` - Category page to open in a fresh session
    /// * `max_triggers` - Upper bound on "load more" clicks; `0` captures the
    ///   first batch as served
    ///
    /// # Returns
    ///
    /// The captured markup with the number of clicks performed and why the
    /// loop stopped.
    ///
    /// # Errors
    ///
    /// Launch, navigation, click and capture faults, and a
    /// [`crate::error::HarvestError::Timeout`] when no container becomes
    /// visible in time. The session is closed before any error is returned.
    #[instrument(level = "info", skip(self))]
    pub async fn expand(&self, url: &str, max_triggers: usize) -> Result<ExpandedDocument> {
        let mut session = self.launcher.launch().await?;
        let outcome = self.drive(session.as_mut(), url, max_triggers).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(document), Ok(())) => Ok(document),
            (Ok(document), Err(e)) => {
                warn!(error = %e, "Session close failed after a complete capture");
                Ok(document)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "Session close failed during abort");
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        session: &mut dyn PageSession,
        url: &str,
        max_triggers: usize,
    ) -> Result<ExpandedDocument> {
        session.goto(url).await?;
        session
            .wait_for_visible(&self.ready_selector, self.config.ready_timeout())
            .await?;

        let started = Instant::now();
        let mut triggers = 0;
        let mut end = ExpansionEnd::BudgetReached;
        while triggers < max_triggers {
            if !session.click_if_present(&self.control_selector).await? {
                info!("Load-more control is gone, nothing left to reveal");
                end = ExpansionEnd::Exhausted;
                break;
            }
            triggers += 1;
            info!(trigger = triggers, "Clicked 'load more'");
            sleep(self.config.throttle()).await;
        }
        let elapsed = started.elapsed();
        info!(triggers, %end, ?elapsed, "Expansion finished");

        let html = session.content().await?;
        Ok(ExpandedDocument {
            url: url.to_string(),
            html,
            triggers,
            end,
            elapsed,
        })
    }
}
