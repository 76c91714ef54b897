//! Inshorts category page extractor.
//!
//! Every field of a record is looked up inside that record's own article
//! container, so a card with a missing date or link cannot shift values
//! between neighbouring articles.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::PageLayout;
use crate::error::{HarvestError, Result};
use crate::models::Record;

/// Origin used to resolve relative category links.
const SITE_ORIGIN: &str = "https://inshorts.com/";

/// Turns one expanded document into records.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    category_marker: Selector,
    container: Selector,
    title: Selector,
    date: Selector,
    description: Selector,
    url_anchor: Selector,
}

impl ContentExtractor {
    /// Compile the layout's selectors.
    pub fn new(layout: &PageLayout) -> Result<Self> {
        Ok(Self {
            category_marker: compile(&layout.category_marker)?,
            container: compile(&layout.article_container)?,
            title: compile(&layout.title)?,
            date: compile(&layout.date)?,
            description: compile(&layout.description)?,
            url_anchor: compile(&layout.url_anchor)?,
        })
    }

    /// Extract every article in `html`.
    ///
    /// # Arguments
    ///
    /// * `html` - Markup captured after pagination
    ///
    /// # Returns
    ///
    /// * `None` when the page-level category marker cannot be read; the cause
    ///   is logged as a warning
    /// * `Some(vec![])` when the page is readable but holds no articles
    /// * otherwise one record per article container, in document order
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let extractor = ContentExtractor::new(&PageLayout::default())?;
    /// if let Some(records) = extractor.extract(&document.html) {
    ///     gateway.insert_all(&records)?;
    /// }
    /// ```
    #[instrument(level = "info", skip_all, fields(bytes = html.len()))]
    pub fn extract(&self, html: &str) -> Option<Vec<Record>> {
        let document = Html::parse_document(html);

        let category = match self.category(&document) {
            Ok(category) => category,
            Err(reason) => {
                warn!(%reason, "Category marker unreadable; no records extracted");
                return None;
            }
        };

        let mut records = Vec::new();
        for (index, container) in document.select(&self.container).enumerate() {
            let title = first_text(container, &self.title);
            let description = first_text(container, &self.description);
            let (Some(title), Some(description)) = (title, description) else {
                warn!(index, "Article container lacks a title or description; skipped");
                continue;
            };
            let date = first_text(container, &self.date).unwrap_or_default();
            let url = container
                .select(&self.url_anchor)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(|href| href.trim().to_string());
            if url.is_none() {
                debug!(index, "Article has no link");
            }
            records.push(Record::new(category.as_str(), title, date, description, url));
        }

        info!(%category, count = records.len(), "Extracted records");
        Some(records)
    }

    fn category(&self, document: &Html) -> std::result::Result<String, String> {
        let marker = document
            .select(&self.category_marker)
            .next()
            .ok_or("category marker not found")?;
        let href = marker
            .value()
            .attr("href")
            .ok_or("category marker has no link target")?;
        category_from_href(href).ok_or_else(|| format!("no category in link '{href}'"))
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| HarvestError::selector(selector, e))
}

/// Whitespace-collapsed text of the first non-blank match under `scope`.
fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).find_map(|node| {
        let text = node.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    })
}

/// Last non-empty path segment of a (possibly relative) link.
fn category_from_href(href: &str) -> Option<String> {
    let base = Url::parse(SITE_ORIGIN).ok()?;
    let resolved = base.join(href.trim()).ok()?;
    resolved
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}
