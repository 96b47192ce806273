use crate::fields::Row;
use crate::import::Summary;
use anyhow::Context;
use std::path::Path;
use tracing::warn;

/// Read one named CSV source as header-keyed rows.
///
/// A missing file is not an error: the entity type simply has zero rows this
/// run, and a warning is surfaced. A structurally malformed record (ragged
/// row, unreadable content) is fatal and aborts the whole transaction.
pub(crate) fn read_rows(dir: &Path, name: &str, summary: &mut Summary) -> anyhow::Result<Vec<Row>> {
    let path = dir.join(name);
    if !path.exists() {
        warn!("file not found: {}", path.display());
        summary.push_warning(format!("file not found: {}", path.display()));
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", name))?
        .clone();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("malformed record {} in {}", idx + 2, name))?;
        let mut row = Row::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), value.to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}
