//! Core data types: one order line and the loaded table.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;

/// Category assigned when the dataset has no category information.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// One transactional row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub order_id: String,
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub region: String,
    pub amount: f64,
    pub quantity: u32,
    pub customer_id: Option<String>,
}

impl Record {
    /// Calendar day of the purchase.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Ordered, immutable collection of records.
///
/// Records are kept in chronological order; the distinct categories and
/// regions are computed once so the filter form can list them.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    categories: BTreeSet<String>,
    regions: BTreeSet<String>,
}

impl Table {
    /// Build a table, sorting records by timestamp. Equal timestamps keep
    /// their input order.
    pub fn from_records(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.timestamp);

        let categories = records.iter().map(|r| r.category.clone()).collect();
        let regions = records.iter().map(|r| r.region.clone()).collect();

        Self {
            records,
            categories,
            regions,
        }
    }

    /// Concatenate several tables, preserving chronological order.
    pub fn concat(tables: Vec<Table>) -> Self {
        let records = tables.into_iter().flat_map(|t| t.records).collect();
        Self::from_records(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct categories.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Sorted distinct regions.
    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// First and last purchase day, `None` for an empty table.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date();
        let last = self.records.last()?.date();
        Some((first, last))
    }
}
