//! Row and aggregate types shared by the pipeline and the query layer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest count a row may carry; the SQLite `Count` column is a signed
/// 64-bit integer
pub const MAX_COUNT: u64 = i64::MAX as u64;

/// One row of the flat table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "State")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: u8,
    #[serde(rename = "Transaction_type")]
    pub category: String,
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Amount")]
    pub amount: f64,
}

impl TransactionRecord {
    pub fn period(&self) -> Period {
        Period::new(self.year, self.quarter)
    }
}

/// A calendar quarter, ordered by year then quarter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub quarter: u8,
}

impl Period {
    pub fn new(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

/// Which sum an aggregate view is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Count,
    #[default]
    Amount,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Count => write!(f, "Count"),
            Metric::Amount => write!(f, "Amount"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(Metric::Count),
            "amount" => Ok(Metric::Amount),
            other => Err(format!("unknown metric `{}` (expected count or amount)", other)),
        }
    }
}

/// Grouping key of an [`AggregateRow`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Region { region: String },
    RegionPeriod { region: String, period: Period },
}

impl GroupKey {
    pub fn region(&self) -> &str {
        match self {
            GroupKey::Region { region } | GroupKey::RegionPeriod { region, .. } => region,
        }
    }

    pub fn period(&self) -> Option<Period> {
        match self {
            GroupKey::Region { .. } => None,
            GroupKey::RegionPeriod { period, .. } => Some(*period),
        }
    }
}

/// Summed count and amount for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub count: u64,
    pub amount: f64,
}

impl AggregateRow {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            count: 0,
            amount: 0.0,
        }
    }

    pub fn add(&mut self, record: &TransactionRecord) {
        // Counts saturate rather than wrap when a group exceeds u64
        self.count = self.count.saturating_add(record.count);
        self.amount += record.amount;
    }

    /// The selected sum, widened to `f64`
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Count => self.count as f64,
            Metric::Amount => self.amount,
        }
    }
}
