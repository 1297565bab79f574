use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::dataset::Dataset;
use crate::model::TransactionRecord;
use crate::schema::TRANSACTIONS;
use crate::ui::Ui;

const PROGRESS_EVERY: u64 = 1000;

/// Write the dataset as CSV, truncating any previous file at `path`
pub fn write_csv(dataset: &Dataset, path: &Path, ui: &mut impl Ui) -> Result<u64> {
    let mut writer = ::csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    // An empty table still gets its header row
    if dataset.is_empty() {
        writer.write_record(TRANSACTIONS.column_names())?;
    }

    let total = dataset.len() as u64;
    let mut count: u64 = 0;

    for record in dataset.iter() {
        writer
            .serialize(record)
            .context("Failed to write row")?;
        count += 1;
        if count % PROGRESS_EVERY == 0 {
            ui.set_progress(count, total, "Rows");
        }
    }

    writer.flush().context("Failed to flush CSV")?;
    ui.set_progress(count, total, "Rows");
    Ok(count)
}

/// Read a flat table written by [`write_csv`] (or any CSV with the same header)
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = ::csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {:?}", path))?;

    let headers = reader.headers().context("Failed to read CSV header")?;
    let expected = TRANSACTIONS.column_names();
    if headers.iter().collect::<Vec<_>>() != expected {
        bail!(
            "Unexpected CSV header in {:?}: expected {}",
            path,
            expected.join(",")
        );
    }

    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<TransactionRecord>().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let record = result.with_context(|| format!("Bad row at line {}", line + 2))?;
        records.push(record);
    }

    Ok(Dataset::new(records))
}
