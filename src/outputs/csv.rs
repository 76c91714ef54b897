//! CSV snapshot with a `category,titles,date,descriptions,urls` header.

use std::path::Path;

use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::Record;

const HEADER: [&str; 5] = ["category", "titles", "date", "descriptions", "urls"];

/// Serialize `records` with a header row. Missing URLs become empty cells.
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_records(records: &[Record], path: &Path) -> Result<()> {
    let csv = to_csv(records)?;
    fs::write(path, csv).await?;
    info!(count = records.len(), "Wrote CSV snapshot");
    Ok(())
}
