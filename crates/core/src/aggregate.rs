//! Aggregation engine.
//!
//! Reduces one resolved set of records to an [`AggregateReport`] in a single pass: a count, the
//! sparse grouped counts of the kind's category field, the average of each metric over its
//! non-null values, and a per-month count series.

use crate::constants::UNSPECIFIED_CATEGORY;
use crate::kind::ClinicalRecord;
use api_shared::wire::MonthlyCount;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// One bucket of the monthly series. `month` is always the first of the month; `None` holds
/// records without a date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthBucket {
    pub month: Option<NaiveDate>,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateReport {
    pub total: u64,
    /// Only categories that occur; values sum to `total`.
    pub grouped_counts: BTreeMap<String, u64>,
    pub averages: BTreeMap<&'static str, Option<f64>>,
    /// Ascending by month, the undated bucket (if any) last.
    pub monthly_series: Vec<MonthBucket>,
}

impl AggregateReport {
    /// Average of the named metric, `None` when no record had a value.
    pub fn average(&self, metric: &str) -> Option<f64> {
        self.averages.get(metric).copied().flatten()
    }

    pub fn monthly_wire(&self) -> Vec<MonthlyCount> {
        self.monthly_series
            .iter()
            .map(|bucket| MonthlyCount {
                month: bucket.month.map(|m| m.format("%Y-%m-%d").to_string()),
                count: bucket.count,
            })
            .collect()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn aggregate<'a, R, I>(rows: I) -> AggregateReport
where
    R: ClinicalRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut total = 0u64;
    let mut grouped_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut sums = vec![(0.0f64, 0u64); R::METRICS.len()];
    let mut months: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut undated = 0u64;

    for row in rows {
        total += 1;

        let category = row.category().unwrap_or(UNSPECIFIED_CATEGORY);
        *grouped_counts.entry(category.to_owned()).or_default() += 1;

        for (index, (sum, count)) in sums.iter_mut().enumerate() {
            if let Some(value) = row.metric(index) {
                *sum += value;
                *count += 1;
            }
        }

        match row.period() {
            Some(date) => *months.entry(first_of_month(date)).or_default() += 1,
            None => undated += 1,
        }
    }

    let averages = R::METRICS
        .iter()
        .zip(sums)
        .map(|(name, (sum, count))| {
            let average = (count > 0).then(|| sum / count as f64);
            (*name, average)
        })
        .collect();

    let mut monthly_series: Vec<MonthBucket> = months
        .into_iter()
        .map(|(month, count)| MonthBucket {
            month: Some(month),
            count,
        })
        .collect();
    if undated > 0 {
        monthly_series.push(MonthBucket {
            month: None,
            count: undated,
        });
    }

    AggregateReport {
        total,
        grouped_counts,
        averages,
        monthly_series,
    }
}
