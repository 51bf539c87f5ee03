//! Customer RFM (recency, frequency, monetary) analysis.

use crate::data::{FilterSpec, Table};
use crate::stats::aggregator::{rank_by, AggregateError, Ranking};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    pub last_purchase: NaiveDate,
    /// Days between the latest purchase in the filtered data and this
    /// customer's last purchase.
    pub recency: i64,
    /// Distinct orders.
    pub frequency: usize,
    /// Revenue.
    pub monetary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmSummary {
    /// Reference day recency is measured from.
    pub reference_date: NaiveDate,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    /// All customers, ordered by id.
    pub customers: Vec<CustomerRfm>,
}

impl RfmSummary {
    /// Most recent customers first.
    pub fn top_by_recency(&self, n: usize) -> Vec<&CustomerRfm> {
        self.rank(Ranking::Lowest, n, |c| c.recency as f64)
    }

    pub fn top_by_frequency(&self, n: usize) -> Vec<&CustomerRfm> {
        self.rank(Ranking::Highest, n, |c| c.frequency as f64)
    }

    pub fn top_by_monetary(&self, n: usize) -> Vec<&CustomerRfm> {
        self.rank(Ranking::Highest, n, |c| c.monetary)
    }

    fn rank<F>(&self, ranking: Ranking, n: usize, value: F) -> Vec<&CustomerRfm>
    where
        F: Fn(&CustomerRfm) -> f64,
    {
        let items = self
            .customers
            .iter()
            .map(|c| (c.customer_id.as_str(), c))
            .collect();
        rank_by(items, ranking, n, |c| value(c))
            .into_iter()
            .map(|(_, c)| c)
            .collect()
    }
}

#[derive(Default)]
struct CustomerAccumulator<'a> {
    last_purchase: Option<NaiveDate>,
    orders: BTreeSet<&'a str>,
    monetary: f64,
}

/// Compute per-customer RFM scores over the filtered records. Records
/// without a customer id are skipped.
pub fn rfm_analysis(table: &Table, filter: &FilterSpec) -> Result<RfmSummary, AggregateError> {
    let mut reference_date: Option<NaiveDate> = None;
    let mut accumulators: BTreeMap<&str, CustomerAccumulator> = BTreeMap::new();

    for record in filter.apply(table) {
        let date = record.date();
        reference_date = reference_date.max(Some(date));

        let Some(customer) = record.customer_id.as_deref() else {
            continue;
        };
        let acc = accumulators.entry(customer).or_default();
        acc.last_purchase = acc.last_purchase.max(Some(date));
        acc.orders.insert(record.order_id.as_str());
        acc.monetary += record.amount;
    }

    let Some(reference_date) = reference_date else {
        return Err(AggregateError::EmptyResult);
    };
    if accumulators.is_empty() {
        return Err(AggregateError::EmptyResult);
    }

    let customers: Vec<CustomerRfm> = accumulators
        .into_iter()
        .filter_map(|(id, acc)| {
            let last_purchase = acc.last_purchase?;
            Some(CustomerRfm {
                customer_id: id.to_string(),
                last_purchase,
                recency: (reference_date - last_purchase).num_days(),
                frequency: acc.orders.len(),
                monetary: acc.monetary,
            })
        })
        .collect();

    let n = customers.len() as f64;
    let avg = |f: fn(&CustomerRfm) -> f64| customers.iter().map(f).sum::<f64>() / n;

    Ok(RfmSummary {
        reference_date,
        avg_recency: avg(|c| c.recency as f64),
        avg_frequency: avg(|c| c.frequency as f64),
        avg_monetary: avg(|c| c.monetary),
        customers,
    })
}
