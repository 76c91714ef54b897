//! Scripted in-memory sessions for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{PageSession, SessionLauncher};
use crate::error::{HarvestError, Result};

/// Simulated spacing between visibility polls; bounds polls per timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where a scripted session should blow up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Goto,
    Wait,
    /// Fail on the n-th click (1-based).
    Click(usize),
    Content,
}

/// Shared counters observed by tests after the session is gone.
#[derive(Debug, Default)]
pub struct Tally {
    pub launches: AtomicUsize,
    pub navigations: AtomicUsize,
    pub clicks: AtomicUsize,
    pub closes: AtomicUsize,
    pub visibility_polls: AtomicUsize,
    pub clicks_while_hidden: AtomicUsize,
}

impl Tally {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
    pub fn visibility_polls(&self) -> usize {
        self.visibility_polls.load(Ordering::SeqCst)
    }
    pub fn clicks_while_hidden(&self) -> usize {
        self.clicks_while_hidden.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedLauncher {
    html: String,
    /// How many times the load-more control can be clicked before it vanishes.
    /// `None` keeps it on the page forever.
    control_lifetime: Option<usize>,
    /// Poll (1-based) on which the article containers become visible.
    /// Before that they are in the markup but hidden.
    visible_after: usize,
    fail_at: Option<FailAt>,
    pub tally: Arc<Tally>,
}

impl ScriptedLauncher {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            control_lifetime: None,
            visible_after: 1,
            fail_at: None,
            tally: Arc::new(Tally::default()),
        }
    }

    pub fn control_lifetime(mut self, clicks: usize) -> Self {
        self.control_lifetime = Some(clicks);
        self
    }

    pub fn visible_after(mut self, polls: usize) -> Self {
        self.visible_after = polls;
        self
    }

    pub fn fail_at(mut self, point: FailAt) -> Self {
        self.fail_at = Some(point);
        self
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        self.tally.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            script: self.clone(),
            clicks: 0,
            visible: false,
        }))
    }
}

struct ScriptedPage {
    script: ScriptedLauncher,
    clicks: usize,
    visible: bool,
}

impl ScriptedPage {
    fn check(&self, point: FailAt) -> Result<()> {
        if self.script.fail_at == Some(point) {
            return Err(HarvestError::browser(format!("scripted failure at {point:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn goto(&mut self, _url: &str) -> Result<()> {
        self.check(FailAt::Goto)?;
        self.script.tally.navigations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let timed_out = || HarvestError::Timeout {
            selector: selector.to_string(),
            waited: timeout,
        };
        if self.script.fail_at == Some(FailAt::Wait) {
            return Err(timed_out());
        }
        let max_polls = (timeout.as_millis() / POLL_INTERVAL.as_millis()).max(1) as usize;
        for poll in 1..=max_polls {
            self.script.tally.visibility_polls.fetch_add(1, Ordering::SeqCst);
            if poll >= self.script.visible_after {
                self.visible = true;
                return Ok(());
            }
        }
        Err(timed_out())
    }

    async fn click_if_present(&mut self, _selector: &str) -> Result<bool> {
        if !self.visible {
            self.script.tally.clicks_while_hidden.fetch_add(1, Ordering::SeqCst);
        }
        if self.script.control_lifetime.is_some_and(|n| self.clicks >= n) {
            return Ok(false);
        }
        self.check(FailAt::Click(self.clicks + 1))?;
        self.clicks += 1;
        self.script.tally.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn content(&mut self) -> Result<String> {
        self.check(FailAt::Content)?;
        Ok(self.script.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.script.tally.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
