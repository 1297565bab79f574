use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A quarter file that contributed no records
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// A directory that could not be listed
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryIssue {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened during one extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_walked: u64,
    pub records_extracted: u64,
    pub skipped_files: Vec<SkippedFile>,
    pub directory_errors: Vec<DirectoryIssue>,
    /// Regions without a boundary feature; `None` when no boundary set was checked
    pub unmatched_regions: Option<Vec<String>>,
}

impl RunSummary {
    pub fn files_skipped(&self) -> u64 {
        self.skipped_files.len() as u64
    }

    pub fn files_processed(&self) -> u64 {
        self.files_walked - self.files_skipped()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files walked:       {}", self.files_walked)?;
        writeln!(f, "Files processed:    {}", self.files_processed())?;
        writeln!(f, "Files skipped:      {}", self.files_skipped())?;
        writeln!(f, "Records extracted:  {}", self.records_extracted)?;
        write!(f, "Directory errors:   {}", self.directory_errors.len())?;

        if let Some(unmatched) = &self.unmatched_regions {
            write!(f, "\nUnmatched regions:  {}", unmatched.len())?;
            for region in unmatched {
                write!(f, "\n  - {}", region)?;
            }
        }

        Ok(())
    }
}
