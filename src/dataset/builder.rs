use serde::Serialize;
use tracing::{debug, info};

use super::summary::{DirectoryIssue, RunSummary, SkippedFile};
use crate::corpus::{CorpusWalker, QuarterFile, WalkPolicy};
use crate::error::{BuildError, DirectoryAccessError};
use crate::model::TransactionRecord;
use crate::parser::{extract_file, FileOutcome};
use crate::ui::{Phase, Tally, Ui};

/// How often the UI tally is refreshed while walking
const TALLY_EVERY: u64 = 50;

/// The flat table: every extracted record, read-only once built
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }
}

impl FromIterator<TransactionRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = TransactionRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Accumulates per-file outcomes into a dataset and its run summary
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    records: Vec<TransactionRecord>,
    summary: RunSummary,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_outcome(&mut self, file: &QuarterFile, outcome: FileOutcome) {
        self.summary.files_walked += 1;

        match outcome {
            FileOutcome::Extracted(records) => {
                debug!("{:?}: {} records", file.path, records.len());
                self.summary.records_extracted += records.len() as u64;
                self.records.extend(records);
            }
            FileOutcome::Skipped(reason) => {
                debug!("Skipping {:?}: {}", file.path, reason);
                self.summary.skipped_files.push(SkippedFile {
                    path: file.path.clone(),
                    reason: reason.to_string(),
                });
            }
        }
    }

    pub fn add_directory_error(&mut self, error: &DirectoryAccessError) {
        debug!("{}", error);
        self.summary.directory_errors.push(DirectoryIssue {
            path: error.path.clone(),
            reason: error.source.to_string(),
        });
    }

    pub fn tally(&self) -> Tally {
        Tally {
            files: self.summary.files_walked,
            records: self.summary.records_extracted,
            skipped: self.summary.files_skipped(),
        }
    }

    /// Seal the table. Rows are put in a fixed order so that rebuilding an
    /// unchanged corpus produces the same artifact.
    pub fn finish(mut self) -> (Dataset, RunSummary) {
        self.records.sort_by(|a, b| {
            (&a.region, a.year, a.quarter, &a.category)
                .cmp(&(&b.region, b.year, b.quarter, &b.category))
        });
        (Dataset::new(self.records), self.summary)
    }
}

/// Walk a corpus and extract every quarter file into one dataset.
///
/// Malformed files are always skipped. Unreadable directories are skipped
/// under [`WalkPolicy::Skip`] and abort the walk under [`WalkPolicy::Strict`].
pub fn build_dataset(
    walker: &CorpusWalker,
    policy: WalkPolicy,
    ui: &mut impl Ui,
) -> Result<(Dataset, RunSummary), BuildError> {
    ui.set_phase(Phase::Extracting);
    ui.set_info(format!("Walking {:?}", walker.root()));

    let mut builder = DatasetBuilder::new();

    for item in walker.walk() {
        if ui.interrupted() {
            return Err(BuildError::Interrupted);
        }

        match item {
            Ok(file) => {
                let outcome = extract_file(&file);
                if let FileOutcome::Skipped(reason) = &outcome {
                    ui.warn(format!("skipped {}: {}", file.path.display(), reason));
                }
                builder.add_outcome(&file, outcome);

                let tally = builder.tally();
                if tally.files % TALLY_EVERY == 0 {
                    ui.set_tally(tally);
                    ui.set_progress(tally.files, 0, "Files");
                }
            }
            Err(error) => {
                if policy == WalkPolicy::Strict {
                    return Err(error.into());
                }
                ui.warn(error.to_string());
                builder.add_directory_error(&error);
            }
        }
    }

    ui.set_tally(builder.tally());
    ui.clear_progress();

    let (dataset, summary) = builder.finish();
    info!(
        "Extracted {} records from {} files ({} skipped)",
        summary.records_extracted,
        summary.files_walked,
        summary.files_skipped()
    );

    Ok((dataset, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordSchemaError;
    use crate::ui::SilentUi;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn record(region: &str, category: &str) -> TransactionRecord {
        TransactionRecord {
            region: region.into(),
            year: 2020,
            quarter: 1,
            category: category.into(),
            count: 1,
            amount: 1.0,
        }
    }

    fn file(path: &str) -> QuarterFile {
        QuarterFile {
            region_raw: "goa".into(),
            year_raw: "2020".into(),
            path: PathBuf::from(path),
        }
    }

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_builder_counts_outcomes() {
        let mut builder = DatasetBuilder::new();
        builder.add_outcome(
            &file("a/1.json"),
            FileOutcome::Extracted(vec![record("Goa", "P2P"), record("Goa", "Others")]),
        );
        builder.add_outcome(
            &file("a/2.json"),
            FileOutcome::Skipped(RecordSchemaError::MissingKey("data")),
        );

        let (dataset, summary) = builder.finish();
        assert_eq!(dataset.len(), 2);
        assert_eq!(summary.files_walked, 2);
        assert_eq!(summary.files_skipped(), 1);
        assert_eq!(summary.records_extracted, 2);
        assert_eq!(summary.skipped_files[0].reason, "missing key `data`");
    }

    #[test]
    fn test_finish_orders_rows() {
        let mut builder = DatasetBuilder::new();
        builder.add_outcome(
            &file("x"),
            FileOutcome::Extracted(vec![
                record("Kerala", "B"),
                record("Goa", "B"),
                record("Goa", "A"),
            ]),
        );
        let (dataset, _) = builder.finish();
        let keys: Vec<(&str, &str)> = dataset
            .iter()
            .map(|r| (r.region.as_str(), r.category.as_str()))
            .collect();
        assert_eq!(keys, vec![("Goa", "A"), ("Goa", "B"), ("Kerala", "B")]);
    }

    #[test]
    fn test_strict_policy_aborts_on_directory_error() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "goa/2020/1.json",
            r#"{"data": {"transactionData": []}}"#,
        );
        write(dir.path(), "stray.txt", "");

        let walker = CorpusWalker::new(dir.path());
        assert!(build_dataset(&walker, WalkPolicy::Strict, &mut SilentUi::new()).is_err());

        let (_, summary) = build_dataset(&walker, WalkPolicy::Skip, &mut SilentUi::new()).unwrap();
        assert_eq!(summary.directory_errors.len(), 1);
        assert_eq!(summary.files_walked, 1);
    }

    /// Asks to stop once a given number of items has been handled
    struct StopAfter {
        remaining: u32,
    }

    impl Ui for StopAfter {
        fn set_phase(&mut self, _phase: Phase) {}
        fn set_info(&mut self, _info: impl Into<String>) {}
        fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
        fn set_tally(&mut self, _tally: Tally) {}
        fn clear_progress(&mut self) {}
        fn log(&mut self, _message: impl Into<String>) {}
        fn warn(&mut self, _message: impl Into<String>) {}

        fn interrupted(&mut self) -> bool {
            if self.remaining == 0 {
                return true;
            }
            self.remaining -= 1;
            false
        }
    }

    #[test]
    fn test_interrupt_stops_the_walk() {
        let dir = TempDir::new().unwrap();
        let report = r#"{"data": {"transactionData": []}}"#;
        write(dir.path(), "goa/2020/1.json", report);
        write(dir.path(), "goa/2020/2.json", report);

        let walker = CorpusWalker::new(dir.path());
        let result = build_dataset(&walker, WalkPolicy::Skip, &mut StopAfter { remaining: 1 });
        assert!(matches!(result, Err(BuildError::Interrupted)));

        let result = build_dataset(&walker, WalkPolicy::Skip, &mut StopAfter { remaining: 2 });
        assert_eq!(result.unwrap().1.files_walked, 2);
    }
}
