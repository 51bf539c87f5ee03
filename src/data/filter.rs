use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::model::{Record, Table};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} date {value:?}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("Start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// User-selected constraints narrowing which records are aggregated.
///
/// Every `None` means "no constraint"; a missing `start` or `end` leaves that
/// side of the date range open. Bounds are inclusive and compare calendar
/// days, not instants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub categories: Option<BTreeSet<String>>,
    pub regions: Option<BTreeSet<String>>,
}

impl FilterSpec {
    /// A filter that keeps every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_date_range(self, start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        self.with_bounds(Some(start), Some(end))
    }

    /// Set either side of the date range; `None` leaves it open.
    pub fn with_bounds(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, FilterError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterError::InvertedRange { start, end });
            }
        }
        self.start = start;
        self.end = end;
        Ok(self)
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Some(regions.into_iter().map(Into::into).collect());
        self
    }

    /// Build a filter from URL query pairs.
    ///
    /// Recognized keys: `start`, `end` (`YYYY-MM-DD`), and repeated
    /// `category` / `region`. Empty values and unknown keys are ignored; a
    /// missing bound leaves that side of the range open.
    pub fn from_query(pairs: &[(String, String)]) -> Result<Self, FilterError> {
        let mut start = None;
        let mut end = None;
        let mut categories: Option<BTreeSet<String>> = None;
        let mut regions: Option<BTreeSet<String>> = None;

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "start" => start = Some(parse_date("start", value)?),
                "end" => end = Some(parse_date("end", value)?),
                "category" => {
                    categories.get_or_insert_with(BTreeSet::new).insert(value.to_string());
                }
                "region" => {
                    regions.get_or_insert_with(BTreeSet::new).insert(value.to_string());
                }
                _ => {}
            }
        }

        FilterSpec {
            categories,
            regions,
            ..FilterSpec::default()
        }
        .with_bounds(start, end)
    }

    /// Whether a record passes every active predicate.
    pub fn matches(&self, record: &Record) -> bool {
        let date = record.date();
        if self.start.is_some_and(|start| date < start) || self.end.is_some_and(|end| date > end) {
            return false;
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&record.category) {
                return false;
            }
        }
        if let Some(regions) = &self.regions {
            if !regions.contains(&record.region) {
                return false;
            }
        }
        true
    }

    /// Records of `table` passing the filter, in table order.
    pub fn apply<'a>(&'a self, table: &'a Table) -> impl Iterator<Item = &'a Record> + 'a {
        table.records().iter().filter(move |r| self.matches(r))
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FilterError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
