//! Headless Chromium sessions over the DevTools protocol.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::{PageSession, SessionLauncher};
use crate::error::{HarvestError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// True when the element has a rendered box, as browsers judge visibility.
const IS_VISIBLE_JS: &str =
    "function() { return !!(this.offsetWidth || this.offsetHeight || this.getClientRects().length); }";

/// Launches one Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    #[instrument(level = "info", skip_all, fields(headless = self.headless))]
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(HarvestError::browser)?;

        let (mut browser, mut handler) = Browser::launch(config).await?;

        // The handler must be polled for the connection to make progress.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler reported an error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.kill().await;
                events.abort();
                return Err(e.into());
            }
        };

        info!("Browser session opened");
        Ok(Box::new(ChromiumSession {
            browser,
            page,
            events,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
    events: JoinHandle<()>,
}

#[async_trait]
impl PageSession for ChromiumSession {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if let Some(element) = self.page.find_elements(selector).await?.into_iter().next() {
                let visible = element
                    .call_js_fn(IS_VISIBLE_JS, false)
                    .await?
                    .result
                    .value
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                if visible {
                    debug!(waited = ?started.elapsed(), "Selector visible");
                    return Ok(());
                }
            }
            if started.elapsed() >= timeout {
                return Err(HarvestError::Timeout {
                    selector: selector.to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click_if_present(&mut self, selector: &str) -> Result<bool> {
        let Some(element) = self.page.find_elements(selector).await?.into_iter().next() else {
            return Ok(false);
        };
        element.click().await?;
        Ok(true)
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumSession {
            mut browser,
            page: _,
            events,
        } = *self;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Graceful browser close failed; killing process");
            let _ = browser.kill().await;
            events.abort();
            return Err(e.into());
        }
        browser.wait().await?;
        if let Err(e) = events.await {
            debug!(error = %e, "CDP handler task ended abnormally");
        }
        info!("Browser session closed");
        Ok(())
    }
}
