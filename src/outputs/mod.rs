//! File snapshots of a harvest.
//!
//! Each run that extracts records can leave a CSV and a JSON copy next to
//! the database rows:
//!
//! ```text
//! export_dir/
//! ├── inshorts_sports_2025-05-06_14-30.csv
//! └── inshorts_sports_2025-05-06_14-30.json
//! ```

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::Result;
use crate::models::Record;
use crate::utils::{ensure_writable_dir, export_stamp};

pub mod csv;
pub mod json;

/// Path of one snapshot file.
pub fn snapshot_path(export_dir: &Path, category: &str, stamp: &str, extension: &str) -> PathBuf {
    export_dir.join(format!("inshorts_{category}_{stamp}.{extension}"))
}

/// Write both snapshots under one timestamp and return their paths.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub async fn write_snapshots(
    records: &[Record],
    export_dir: &Path,
    category: &str,
) -> Result<Vec<PathBuf>> {
    ensure_writable_dir(export_dir).await?;
    let stamp = export_stamp();

    let csv_path = snapshot_path(export_dir, category, &stamp, "csv");
    csv::write_records(records, &csv_path).await?;

    let json_path = snapshot_path(export_dir, category, &stamp, "json");
    json::write_records(records, &json_path).await?;

    info!(csv = %csv_path.display(), json = %json_path.display(), "Wrote snapshots");
    Ok(vec![csv_path, json_path])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_path_layout() {
        let path = snapshot_path(Path::new("dataset"), "sports", "2025-05-06_14-30", "csv");
        assert_eq!(path, Path::new("dataset/inshorts_sports_2025-05-06_14-30.csv"));
    }

    #[tokio::test]
    async fn test_write_snapshots_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path().join("nested/dataset");
        let records = vec![Record::new("sports", "T", "d", "D", None)];

        let paths = write_snapshots(&records, &export_dir, "sports").await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(paths[0].extension().is_some_and(|e| e == "csv"));
        assert!(paths[1].extension().is_some_and(|e| e == "json"));
    }
}
