//! Browser session seam.
//!
//! The pagination driver talks to the page only through [`PageSession`], and
//! obtains sessions only through a [`SessionLauncher`]. Production code uses
//! [`chromium::ChromiumLauncher`]; tests substitute a scripted page.
//!
//! A session is single-use: launched for one harvest and consumed by
//! [`PageSession::close`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub mod chromium;
#[cfg(test)]
pub(crate) mod fake;

pub use chromium::ChromiumLauncher;

/// One open browser tab.
#[async_trait]
pub trait PageSession: Send {
    /// Navigate to `url` and wait for the load to settle.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait until the first element matching `selector` is visible.
    ///
    /// An element present in the markup but hidden or without a layout box
    /// does not count. Fails with [`crate::error::HarvestError::Timeout`] once
    /// `timeout` elapses.
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first element matching `selector`.
    ///
    /// Returns `Ok(false)` when nothing matches; that is an expected outcome,
    /// not a failure.
    async fn click_if_present(&mut self, selector: &str) -> Result<bool>;

    /// Serialize the current document.
    async fn content(&mut self) -> Result<String>;

    /// Tear the session down, releasing the browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Factory for fresh, isolated sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageSession>>;
}
