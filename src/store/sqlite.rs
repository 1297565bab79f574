use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert, generate_select};
use crate::dataset::Dataset;
use crate::model::TransactionRecord;
use crate::schema::TRANSACTIONS;
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Create a fresh database, replacing any previous one at `db_path`
    pub fn new(db_path: &Path) -> Result<Self> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path)
            .context("Failed to create database")?;

        conn.execute_batch(
            "PRAGMA journal_mode = DELETE;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;"
        )?;

        Ok(Self { conn })
    }

    pub fn create_table(&self) -> Result<()> {
        self.conn
            .execute(&generate_create_table(&TRANSACTIONS), [])
            .context("Failed to create transactions table")?;

        for index_sql in generate_indexes(&TRANSACTIONS) {
            self.conn
                .execute(&index_sql, [])
                .context("Failed to create index")?;
        }

        Ok(())
    }

    /// Insert every record in one transaction, reporting progress per batch
    pub fn insert_records(
        &mut self,
        records: &[TransactionRecord],
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let insert_sql = generate_insert(&TRANSACTIONS);
        let total = records.len() as u64;
        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;

        {
            let mut stmt = tx.prepare_cached(&insert_sql)?;
            for batch in records.chunks(BATCH_SIZE) {
                for record in batch {
                    stmt.execute(params![
                        record.region,
                        record.year,
                        record.quarter,
                        record.category,
                        i64::try_from(record.count).context("Count does not fit in SQLite")?,
                        record.amount,
                    ])?;
                }
                count += batch.len() as u64;
                ui.set_progress(count, total, "Rows");
                if ui.interrupted() {
                    bail!("Writing interrupted");
                }
            }
        }

        tx.commit()?;
        Ok(count)
    }

    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Write the dataset to a new SQLite database at `path`
pub fn write_sqlite(dataset: &Dataset, path: &Path, ui: &mut impl Ui) -> Result<u64> {
    let mut writer = SqliteWriter::new(path)?;
    writer.create_table()?;
    let count = writer.insert_records(dataset.records(), ui)?;
    writer.finalize()?;
    Ok(count)
}

/// Read the transactions table back into memory
pub fn read_sqlite(path: &Path) -> Result<Dataset> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open database {:?}", path))?;

    let mut stmt = conn
        .prepare(&generate_select(&TRANSACTIONS))
        .context("Database has no transactions table")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i32>(1)?,
            row.get::<_, u8>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
            row.get::<_, f64>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (region, year, quarter, category, count, amount) = row?;
        records.push(TransactionRecord {
            region,
            year,
            quarter,
            category,
            count: u64::try_from(count).context("Negative count in database")?,
            amount,
        });
    }

    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pulse.db");
        let dataset = Dataset::new(vec![TransactionRecord {
            region: "Goa".into(),
            year: 2022,
            quarter: 4,
            category: "Peer-to-peer payments".into(),
            count: 123_456,
            amount: 98765.25,
        }]);

        assert_eq!(write_sqlite(&dataset, &path, &mut SilentUi::new()).unwrap(), 1);
        assert_eq!(read_sqlite(&path).unwrap(), dataset);
    }

    #[test]
    fn test_rewrite_replaces_previous_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pulse.db");
        let first = Dataset::new(vec![TransactionRecord {
            region: "Goa".into(),
            year: 2022,
            quarter: 4,
            category: "Others".into(),
            count: 1,
            amount: 1.0,
        }]);

        write_sqlite(&first, &path, &mut SilentUi::new()).unwrap();
        write_sqlite(&Dataset::default(), &path, &mut SilentUi::new()).unwrap();
        assert!(read_sqlite(&path).unwrap().is_empty());
    }
}
