//! Small helpers shared by the pipeline and the exporters.

use std::path::Path;

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::error::Result;

/// Local timestamp used in snapshot file names, e.g. `2025-05-06_14-30`.
pub fn export_stamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with
/// an ellipsis and the dropped byte count appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    drop(fs::File::create(&probe_path).await?);
    if let Err(e) = fs::remove_file(&probe_path).await {
        warn!(error = %e, probe = %probe_path.display(), "Could not remove write probe");
    }
    info!("Output directory is writable");
    Ok(())
}
