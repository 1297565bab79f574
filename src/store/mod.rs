//! Persistence of the flat table
//!
//! The format follows the file extension: `.db`, `.sqlite` and `.sqlite3`
//! are SQLite databases, anything else is CSV. Saving always replaces the
//! previous artifact wholesale.

pub mod csv;
pub mod schema_gen;
pub mod sqlite;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::dataset::Dataset;
use crate::ui::{Phase, Ui};

pub use self::csv::{read_csv, write_csv};
pub use self::sqlite::{read_sqlite, write_sqlite, SqliteWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Sqlite,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("db" | "sqlite" | "sqlite3") => TableFormat::Sqlite,
            _ => TableFormat::Csv,
        }
    }
}

/// Persist the dataset at `path`, returning the number of rows written
pub fn save_table(dataset: &Dataset, path: &Path, ui: &mut impl Ui) -> Result<u64> {
    ui.set_phase(Phase::Writing);
    let format = TableFormat::from_path(path);
    ui.set_info(format!("Writing {:?} ({:?})", path, format));

    let rows = match format {
        TableFormat::Csv => write_csv(dataset, path, ui)?,
        TableFormat::Sqlite => write_sqlite(dataset, path, ui)?,
    };

    ui.clear_progress();
    info!("Wrote {} rows to {:?}", rows, path);
    Ok(rows)
}

/// Load a table previously written by [`save_table`]
pub fn load_table(path: &Path) -> Result<Dataset> {
    let dataset = match TableFormat::from_path(path) {
        TableFormat::Csv => read_csv(path)?,
        TableFormat::Sqlite => read_sqlite(path)?,
    };
    info!("Loaded {} rows from {:?}", dataset.len(), path);
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_path(&PathBuf::from("t.csv")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(&PathBuf::from("t")), TableFormat::Csv);
        assert_eq!(TableFormat::from_path(&PathBuf::from("t.DB")), TableFormat::Sqlite);
        assert_eq!(
            TableFormat::from_path(&PathBuf::from("out/pulse.sqlite3")),
            TableFormat::Sqlite
        );
    }
}
