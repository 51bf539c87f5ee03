//! CSV Data Loader Module
//! Reads order files with Polars and converts them into typed records.

use crate::config::{ColumnNames, DatasetConfig};
use crate::data::model::{Record, Table, UNKNOWN_CATEGORY};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use polars::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("Failed to load CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("{}: missing required column '{column}' (accepted names: {accepted})", .path.display())]
    Schema {
        path: PathBuf,
        column: &'static str,
        accepted: String,
    },
    #[error("{}: row {row}: invalid {column} value {value:?}", .path.display())]
    InvalidField {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("No data files given")]
    NoData,
}

/// Header names resolved against one file.
struct ResolvedColumns {
    order_id: String,
    timestamp: String,
    category: Option<String>,
    region: String,
    amount: String,
    quantity: Option<String>,
    customer_id: Option<String>,
}

/// Loads order CSV files into a [`Table`].
pub struct DataLoader {
    columns: ColumnNames,
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnNames::default(), b',')
    }
}

impl DataLoader {
    pub fn new(columns: ColumnNames, separator: u8) -> Self {
        Self { columns, separator }
    }

    pub fn from_config(config: &DatasetConfig) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::new(config.columns.clone(), config.separator_byte()?))
    }

    /// Load every file and merge them into one chronologically sorted table.
    /// Files are parsed in parallel; the first failure aborts the load.
    pub fn load_all(&self, paths: &[PathBuf]) -> Result<Table, LoadError> {
        if paths.is_empty() {
            return Err(LoadError::NoData);
        }

        let tables = paths
            .par_iter()
            .map(|path| self.load_csv(path))
            .collect::<Result<Vec<_>, _>>()?;

        let table = Table::concat(tables);
        info!(
            "Loaded {} records from {} file(s): {} categories, {} regions",
            table.len(),
            paths.len(),
            table.categories().len(),
            table.regions().len()
        );
        Ok(table)
    }

    /// Load a single CSV file.
    pub fn load_csv(&self, path: &Path) -> Result<Table, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }

        let csv_err = |source: PolarsError| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        // Every column is read as a string; typed parsing happens per record
        // so that bad fields can be reported with their row.
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(self.separator)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(csv_err)?;

        let header: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let resolved = self.resolve_columns(path, &header)?;
        debug!(
            "{}: {} rows, columns {:?}",
            path.display(),
            df.height(),
            header
        );

        let column = |name: &str| df.column(name).and_then(|c| c.str()).map_err(csv_err);
        let order_ids = column(&resolved.order_id)?;
        let timestamps = column(&resolved.timestamp)?;
        let regions = column(&resolved.region)?;
        let amounts = column(&resolved.amount)?;
        let categories = Self::optional_column(&df, resolved.category.as_deref()).map_err(csv_err)?;
        let quantities = Self::optional_column(&df, resolved.quantity.as_deref()).map_err(csv_err)?;
        let customers =
            Self::optional_column(&df, resolved.customer_id.as_deref()).map_err(csv_err)?;

        // Rows are reported 1-based, header excluded.
        let invalid = |row: usize, column: &'static str, value: Option<&str>| {
            LoadError::InvalidField {
                path: path.to_path_buf(),
                row: row + 1,
                column,
                value: value.unwrap_or_default().to_string(),
            }
        };

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let order_id = non_empty(order_ids.get(i))
                .ok_or_else(|| invalid(i, "order_id", order_ids.get(i)))?;
            let region =
                non_empty(regions.get(i)).ok_or_else(|| invalid(i, "region", regions.get(i)))?;

            let timestamp = timestamps
                .get(i)
                .and_then(parse_timestamp)
                .ok_or_else(|| invalid(i, "timestamp", timestamps.get(i)))?;

            let amount = amounts
                .get(i)
                .and_then(parse_amount)
                .ok_or_else(|| invalid(i, "amount", amounts.get(i)))?;

            let quantity = match quantities.and_then(|q| non_empty(q.get(i))) {
                Some(raw) => raw
                    .parse::<u32>()
                    .map_err(|_| invalid(i, "quantity", Some(raw)))?,
                None => 1,
            };

            let category = categories
                .and_then(|c| non_empty(c.get(i)))
                .unwrap_or(UNKNOWN_CATEGORY);
            let customer_id = customers.and_then(|c| non_empty(c.get(i)));

            records.push(Record {
                order_id: order_id.to_string(),
                timestamp,
                category: category.to_string(),
                region: region.to_string(),
                amount,
                quantity,
                customer_id: customer_id.map(str::to_string),
            });
        }

        Ok(Table::from_records(records))
    }

    fn optional_column<'a>(
        df: &'a DataFrame,
        name: Option<&str>,
    ) -> PolarsResult<Option<&'a StringChunked>> {
        name.map(|n| df.column(n).and_then(|c| c.str())).transpose()
    }

    fn resolve_columns(&self, path: &Path, header: &[String]) -> Result<ResolvedColumns, LoadError> {
        let find = |accepted: &[String]| {
            accepted
                .iter()
                .find(|name| header.contains(*name))
                .cloned()
        };
        let require = |column: &'static str, accepted: &[String]| {
            find(accepted).ok_or_else(|| LoadError::Schema {
                path: path.to_path_buf(),
                column,
                accepted: accepted.join(", "),
            })
        };

        Ok(ResolvedColumns {
            order_id: require("order_id", &self.columns.order_id)?,
            timestamp: require("timestamp", &self.columns.timestamp)?,
            category: find(&self.columns.category),
            region: require("region", &self.columns.region)?,
            amount: require("amount", &self.columns.amount)?,
            quantity: find(&self.columns.quantity),
            customer_id: find(&self.columns.customer_id),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse `YYYY-MM-DD HH:MM:SS`, the `T`-separated form (both with optional
/// fractional seconds) or a bare date at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
