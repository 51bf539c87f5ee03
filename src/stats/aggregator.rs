//! Aggregation Layer
//! Grouped summary statistics over the filtered records.

use crate::data::{FilterSpec, Record, Table};
use crate::stats::calculator::{Descriptive, StatsCalculator};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No records match the current filter")]
    EmptyResult,
}

/// Dimension records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Region,
}

impl GroupBy {
    fn key(self, record: &Record) -> String {
        match self {
            GroupBy::Category => record.category.clone(),
            GroupBy::Region => record.region.clone(),
        }
    }
}

/// Metric used to rank groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Revenue,
    Orders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    Highest,
    Lowest,
}

/// Metrics of one group. `count`, `sum` and `mean` are over order-line
/// amounts; `orders` counts distinct order ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub quantity: u64,
    pub orders: usize,
}

impl GroupMetrics {
    fn from_records(records: &[&Record]) -> Self {
        let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();
        let Descriptive {
            count,
            sum,
            mean,
            median,
            std,
            min,
            max,
        } = StatsCalculator::describe(&amounts);

        let orders: BTreeSet<&str> = records.iter().map(|r| r.order_id.as_str()).collect();

        Self {
            count,
            sum,
            mean,
            median,
            std,
            min,
            max,
            quantity: records.iter().map(|r| u64::from(r.quantity)).sum(),
            orders: orders.len(),
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.sum,
            Metric::Orders => self.orders as f64,
        }
    }
}

/// Group key → metrics, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub group_by: GroupBy,
    pub groups: BTreeMap<String, GroupMetrics>,
}

impl AggregateResult {
    pub fn get(&self, key: &str) -> Option<&GroupMetrics> {
        self.groups.get(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of records across all groups.
    pub fn total_count(&self) -> usize {
        self.groups.values().map(|m| m.count).sum()
    }

    /// The `n` best (or worst) groups by `metric`; ties go to the
    /// lexicographically smaller key.
    pub fn top_n(&self, metric: Metric, ranking: Ranking, n: usize) -> Vec<(&str, &GroupMetrics)> {
        let items = self
            .groups
            .iter()
            .map(|(k, m)| (k.as_str(), m))
            .collect::<Vec<_>>();
        rank_by(items, ranking, n, |m| m.value(metric))
    }
}

/// Sort `(key, item)` pairs by `value` and keep the first `n`. Equal values
/// are ordered by key ascending regardless of direction.
pub fn rank_by<K, T, F>(mut items: Vec<(K, T)>, ranking: Ranking, n: usize, value: F) -> Vec<(K, T)>
where
    K: Ord,
    F: Fn(&T) -> f64,
{
    items.sort_by(|(ka, a), (kb, b)| {
        let by_value = match ranking {
            Ranking::Highest => value(b).total_cmp(&value(a)),
            Ranking::Lowest => value(a).total_cmp(&value(b)),
        };
        by_value.then_with(|| ka.cmp(kb))
    });
    items.truncate(n);
    items
}

/// Group the filtered records and compute per-group metrics.
pub fn aggregate(
    table: &Table,
    filter: &FilterSpec,
    group_by: GroupBy,
) -> Result<AggregateResult, AggregateError> {
    let mut buckets: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for record in filter.apply(table) {
        buckets.entry(group_by.key(record)).or_default().push(record);
    }

    if buckets.is_empty() {
        return Err(AggregateError::EmptyResult);
    }

    let groups = buckets
        .into_iter()
        .map(|(key, records)| (key, GroupMetrics::from_records(&records)))
        .collect();

    Ok(AggregateResult { group_by, groups })
}

/// Headline numbers for the filtered records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub rows: usize,
    pub orders: usize,
    pub revenue: f64,
    pub quantity: u64,
}

pub fn totals(table: &Table, filter: &FilterSpec) -> Result<Totals, AggregateError> {
    let records: Vec<&Record> = filter.apply(table).collect();
    if records.is_empty() {
        return Err(AggregateError::EmptyResult);
    }

    let metrics = GroupMetrics::from_records(&records);
    Ok(Totals {
        rows: metrics.count,
        orders: metrics.orders,
        revenue: metrics.sum,
        quantity: metrics.quantity,
    })
}

/// Orders and revenue of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub orders: usize,
    pub revenue: f64,
}

/// Daily distinct orders and revenue between the first and last matching
/// day. Days without orders inside that span are reported as zeros.
pub fn daily_series(table: &Table, filter: &FilterSpec) -> Result<Vec<DailyPoint>, AggregateError> {
    let mut days: BTreeMap<NaiveDate, (BTreeSet<&str>, f64)> = BTreeMap::new();
    for record in filter.apply(table) {
        let (orders, revenue) = days.entry(record.date()).or_default();
        orders.insert(record.order_id.as_str());
        *revenue += record.amount;
    }

    let (Some(&first), Some(&last)) = (days.keys().next(), days.keys().next_back()) else {
        return Err(AggregateError::EmptyResult);
    };

    Ok(first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| match days.get(&date) {
            Some((orders, revenue)) => DailyPoint {
                date,
                orders: orders.len(),
                revenue: *revenue,
            },
            None => DailyPoint {
                date,
                orders: 0,
                revenue: 0.0,
            },
        })
        .collect())
}

/// Distinct customers of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCustomers {
    pub region: String,
    pub customers: usize,
}

/// Regions with the most distinct customers. Records without a customer id
/// are not counted.
pub fn customers_by_region(
    table: &Table,
    filter: &FilterSpec,
    n: usize,
) -> Result<Vec<RegionCustomers>, AggregateError> {
    let mut regions: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in filter.apply(table) {
        if let Some(customer) = record.customer_id.as_deref() {
            regions.entry(record.region.as_str()).or_default().insert(customer);
        }
    }

    if regions.is_empty() {
        return Err(AggregateError::EmptyResult);
    }

    let counts = regions.into_iter().map(|(r, c)| (r, c.len())).collect();
    Ok(rank_by(counts, Ranking::Highest, n, |c| *c as f64)
        .into_iter()
        .map(|(region, customers)| RegionCustomers {
            region: region.to_string(),
            customers,
        })
        .collect())
}
