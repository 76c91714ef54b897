//! JSON snapshot: an array of record objects indented by four spaces.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::Record;

/// Serialize `records` the way the snapshot file stores them.
pub fn to_json(records: &[Record]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    Ok(out)
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[Record], path: &Path) -> Result<()> {
    let json = to_json(records)?;
    fs::write(path, json).await?;
    info!(count = records.len(), "Wrote JSON snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_space_indent_and_null_url() {
        let records = vec![Record::new("world", "Title", "1 Jan", "Body", None)];
        let text = String::from_utf8(to_json(&records).unwrap()).unwrap();

        assert!(text.starts_with("[\n    {\n        \"category\": \"world\""));
        assert!(text.contains("\"urls\": null"));
    }

    #[test]
    fn test_empty_set_is_empty_array() {
        assert_eq!(to_json(&[]).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_written_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let records = vec![
            Record::new("world", "A", "d", "B", Some("https://x/1".into())),
            Record::new("world", "C", "", "D", None),
        ];

        write_records(&records, &path).await.unwrap();
        let back: Vec<Record> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, records);
    }
}
