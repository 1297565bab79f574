use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::boundary::{BoundarySet, RegionBoundary};
use crate::canonical::NameCanonicalizer;
use crate::config::Settings;
use crate::dataset::Dataset;
use crate::model::{Metric, Period};
use crate::store::load_table;

/// A region whose name resolved to a boundary feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRegion {
    pub region: String,
    /// Normalized key shared with the boundary feature
    pub key: String,
    pub boundary_name: String,
    pub count: u64,
    pub amount: f64,
    pub value: f64,
}

/// Per-region sums of one period joined to the boundary reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryJoin {
    pub period: Period,
    pub metric: Metric,
    pub matched: Vec<JoinedRegion>,
    /// Regions with data but no boundary feature
    pub unmatched: Vec<String>,
}

/// The loaded table plus everything needed to join it to the map.
///
/// Nothing in a session changes after construction, so it can be shared
/// across threads freely. To pick up a rebuilt table, open a new session.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Dataset,
    canonicalizer: NameCanonicalizer,
    boundaries: Option<BoundarySet>,
}

impl Session {
    pub fn new(dataset: Dataset, canonicalizer: NameCanonicalizer) -> Self {
        Self {
            dataset,
            canonicalizer,
            boundaries: None,
        }
    }

    pub fn with_boundaries(mut self, boundaries: BoundarySet) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// Load a persisted table and, optionally, a boundary file
    pub fn open(table: &Path, boundaries: Option<&Path>, settings: &Settings) -> Result<Self> {
        let session = Self::new(load_table(table)?, settings.canonicalizer());
        match boundaries {
            Some(path) => Ok(session.with_boundaries(BoundarySet::load(
                path,
                &settings.boundary_name_property,
            )?)),
            None => Ok(session),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn canonicalizer(&self) -> &NameCanonicalizer {
        &self.canonicalizer
    }

    pub fn boundaries(&self) -> Option<&BoundarySet> {
        self.boundaries.as_ref()
    }

    /// Boundary feature for a region name as stored in the table
    pub fn resolve(&self, region: &str) -> Option<&RegionBoundary> {
        let boundaries = self.boundaries.as_ref()?;
        boundaries.get(&self.canonicalizer.canonicalize(region))
    }

    /// Group-sum one period by region and attach each region to its feature.
    ///
    /// Regions that cannot be resolved are listed in `unmatched` and left out
    /// of `matched`. Categories are always summed together.
    pub fn choropleth(&self, year: i32, quarter: u8, metric: Metric) -> BoundaryJoin {
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();

        for row in self.dataset.group_sum_by_region(year, quarter, metric) {
            let region = row.key.region().to_string();
            match self.resolve(&region) {
                Some(boundary) => matched.push(JoinedRegion {
                    key: boundary.key.clone(),
                    boundary_name: boundary.name.clone(),
                    value: row.value(metric),
                    count: row.count,
                    amount: row.amount,
                    region,
                }),
                None => unmatched.push(region),
            }
        }
        unmatched.sort();

        BoundaryJoin {
            period: Period::new(year, quarter),
            metric,
            matched,
            unmatched,
        }
    }

    /// Every region in the table that has no boundary feature, sorted
    pub fn unmatched_regions(&self) -> Vec<String> {
        self.dataset
            .regions()
            .into_iter()
            .filter(|region| self.resolve(region).is_none())
            .map(str::to_string)
            .collect()
    }
}
