//! Corpus → flat table, end to end

use anyhow::Result;
use std::path::PathBuf;

use crate::boundary::BoundarySet;
use crate::canonical::NameCanonicalizer;
use crate::corpus::{CorpusWalker, WalkPolicy};
use crate::dataset::{build_dataset, RunSummary};
use crate::query::Session;
use crate::store::save_table;
use crate::ui::Ui;

/// One extraction run
pub struct ExtractionJob {
    pub corpus_dir: PathBuf,
    pub output: PathBuf,
    pub policy: WalkPolicy,
    /// When set, region names are checked against these boundaries
    pub boundaries: Option<BoundarySet>,
    pub canonicalizer: NameCanonicalizer,
}

impl ExtractionJob {
    pub fn new(corpus_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            output: output.into(),
            policy: WalkPolicy::default(),
            boundaries: None,
            canonicalizer: NameCanonicalizer::new(),
        }
    }

    /// Walk, extract and persist, replacing any previous table at `output`.
    ///
    /// Malformed report files never fail the run; they are listed in the
    /// returned summary along with unreadable directories and, if boundaries
    /// were given, regions that did not resolve.
    pub fn run(self, ui: &mut impl Ui) -> Result<RunSummary> {
        let walker = CorpusWalker::new(&self.corpus_dir);
        let (dataset, mut summary) = build_dataset(&walker, self.policy, ui)?;

        save_table(&dataset, &self.output, ui)?;

        if let Some(boundaries) = self.boundaries {
            let session = Session::new(dataset, self.canonicalizer).with_boundaries(boundaries);
            let unmatched = session.unmatched_regions();
            for region in &unmatched {
                ui.warn(format!("no boundary for region `{}`", region));
            }
            summary.unmatched_regions = Some(unmatched);
        }

        Ok(summary)
    }
}
