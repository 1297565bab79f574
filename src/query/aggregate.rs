use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::dataset::Dataset;
use crate::model::{AggregateRow, GroupKey, Metric, Period, TransactionRecord};

/// One point of a per-region series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// Period-ordered values of one metric for one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesLine {
    pub region: String,
    pub points: Vec<SeriesPoint>,
}

/// Descending by metric, then ascending by region
fn by_metric_desc(metric: Metric) -> impl Fn(&AggregateRow, &AggregateRow) -> Ordering {
    move |a, b| {
        b.value(metric)
            .total_cmp(&a.value(metric))
            .then_with(|| a.key.region().cmp(b.key.region()))
    }
}

impl Dataset {
    /// Rows matching year, quarter and category exactly, in table order
    pub fn filter(&self, year: i32, quarter: u8, category: &str) -> Vec<&TransactionRecord> {
        self.iter()
            .filter(|r| r.year == year && r.quarter == quarter && r.category == category)
            .collect()
    }

    /// Rows of one period across all categories
    pub fn period_rows(
        &self,
        year: i32,
        quarter: u8,
    ) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.iter()
            .filter(move |r| r.year == year && r.quarter == quarter)
    }

    /// Count and amount per region for one period, summed over categories.
    ///
    /// Regions with no rows in that period are absent. Rows are ordered by
    /// the chosen metric, largest first.
    pub fn group_sum_by_region(
        &self,
        year: i32,
        quarter: u8,
        metric: Metric,
    ) -> Vec<AggregateRow> {
        let mut groups: HashMap<&str, AggregateRow> = HashMap::new();

        for record in self.period_rows(year, quarter) {
            groups
                .entry(record.region.as_str())
                .or_insert_with(|| {
                    AggregateRow::new(GroupKey::Region {
                        region: record.region.clone(),
                    })
                })
                .add(record);
        }

        let mut rows: Vec<AggregateRow> = groups.into_values().collect();
        rows.sort_by(by_metric_desc(metric));
        rows
    }

    /// Count and amount per (region, period) for the given regions, summed
    /// over categories. Ordered by region, then period.
    pub fn time_series_rows(&self, regions: &[&str]) -> Vec<AggregateRow> {
        let wanted: HashSet<&str> = regions.iter().copied().collect();
        let mut groups: BTreeMap<(&str, Period), AggregateRow> = BTreeMap::new();

        for record in self.iter().filter(|r| wanted.contains(r.region.as_str())) {
            let period = record.period();
            groups
                .entry((record.region.as_str(), period))
                .or_insert_with(|| {
                    AggregateRow::new(GroupKey::RegionPeriod {
                        region: record.region.clone(),
                        period,
                    })
                })
                .add(record);
        }

        groups.into_values().collect()
    }

    /// One line per requested region that has data, each holding one point
    /// per period in ascending period order.
    pub fn time_series(&self, regions: &[&str], metric: Metric) -> Vec<SeriesLine> {
        let mut lines: Vec<SeriesLine> = Vec::new();

        for row in self.time_series_rows(regions) {
            let Some(period) = row.key.period() else {
                continue;
            };
            let point = SeriesPoint {
                period,
                value: row.value(metric),
            };
            match lines.last_mut() {
                Some(line) if line.region == row.key.region() => line.points.push(point),
                _ => lines.push(SeriesLine {
                    region: row.key.region().to_string(),
                    points: vec![point],
                }),
            }
        }

        lines
    }

    pub fn total_count(&self) -> u64 {
        self.iter().fold(0u64, |acc, r| acc.saturating_add(r.count))
    }

    pub fn total_amount(&self) -> f64 {
        self.iter().map(|r| r.amount).sum()
    }

    pub fn years(&self) -> Vec<i32> {
        distinct(self.iter().map(|r| r.year))
    }

    pub fn quarters(&self) -> Vec<u8> {
        distinct(self.iter().map(|r| r.quarter))
    }

    pub fn periods(&self) -> Vec<Period> {
        distinct(self.iter().map(TransactionRecord::period))
    }

    pub fn categories(&self) -> Vec<&str> {
        distinct(self.iter().map(|r| r.category.as_str()))
    }

    pub fn regions(&self) -> Vec<&str> {
        distinct(self.iter().map(|r| r.region.as_str()))
    }
}

fn distinct<T: Ord>(values: impl Iterator<Item = T>) -> Vec<T> {
    values.collect::<BTreeSet<T>>().into_iter().collect()
}
