//! Every view of the dashboard computed for one filter.

use crate::data::{FilterSpec, Table};
use crate::stats::aggregator::{
    aggregate, customers_by_region, daily_series, totals, AggregateError, AggregateResult,
    DailyPoint, GroupBy, Metric, Ranking, RegionCustomers, Totals,
};
use crate::stats::rfm::{rfm_analysis, CustomerRfm};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

/// Best and worst categories by revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPerformance {
    pub best: Vec<(String, f64)>,
    pub worst: Vec<(String, f64)>,
}

impl CategoryPerformance {
    fn from_result(result: &AggregateResult, n: usize) -> Self {
        let pick = |ranking| -> Vec<(String, f64)> {
            result
                .top_n(Metric::Revenue, ranking, n)
                .into_iter()
                .map(|(k, m)| (k.to_string(), m.sum))
                .collect()
        };
        Self {
            best: pick(Ranking::Highest),
            worst: pick(Ranking::Lowest),
        }
    }
}

/// RFM averages and the leading customers on each axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmHighlights {
    pub reference_date: NaiveDate,
    pub customers: usize,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub by_recency: Vec<CustomerRfm>,
    pub by_frequency: Vec<CustomerRfm>,
    pub by_monetary: Vec<CustomerRfm>,
}

/// The dashboard's views. A `None` view matched no records and is shown as
/// an empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub filter: FilterSpec,
    pub totals: Option<Totals>,
    pub daily: Option<Vec<DailyPoint>>,
    pub by_category: Option<AggregateResult>,
    pub category_performance: Option<CategoryPerformance>,
    pub by_region: Option<AggregateResult>,
    /// Regions with the most distinct orders.
    pub top_regions: Option<Vec<(String, usize)>>,
    pub customers_by_region: Option<Vec<RegionCustomers>>,
    pub rfm: Option<RfmHighlights>,
}

impl DashboardSummary {
    pub fn compute(table: &Table, filter: &FilterSpec, top_n: usize) -> Self {
        let by_category = aggregate(table, filter, GroupBy::Category);
        let category_performance = by_category
            .as_ref()
            .ok()
            .map(|result| CategoryPerformance::from_result(result, top_n));

        let by_region = aggregate(table, filter, GroupBy::Region);
        let top_regions = by_region.as_ref().ok().map(|result| {
            result
                .top_n(Metric::Orders, Ranking::Highest, top_n)
                .into_iter()
                .map(|(k, m)| (k.to_string(), m.orders))
                .collect::<Vec<_>>()
        });

        let rfm = rfm_analysis(table, filter).map(|rfm| {
            let owned = |list: Vec<&CustomerRfm>| -> Vec<CustomerRfm> {
                list.into_iter().cloned().collect()
            };
            RfmHighlights {
                reference_date: rfm.reference_date,
                customers: rfm.customers.len(),
                avg_recency: rfm.avg_recency,
                avg_frequency: rfm.avg_frequency,
                avg_monetary: rfm.avg_monetary,
                by_recency: owned(rfm.top_by_recency(top_n)),
                by_frequency: owned(rfm.top_by_frequency(top_n)),
                by_monetary: owned(rfm.top_by_monetary(top_n)),
            }
        });

        let summary = Self {
            filter: filter.clone(),
            totals: ok_or_empty(totals(table, filter)),
            daily: ok_or_empty(daily_series(table, filter)),
            category_performance,
            by_category: ok_or_empty(by_category),
            by_region: ok_or_empty(by_region),
            top_regions,
            customers_by_region: ok_or_empty(customers_by_region(table, filter, top_n)),
            rfm: ok_or_empty(rfm),
        };
        debug!(
            "Computed dashboard for {:?}: {} matching rows",
            summary.filter,
            summary.totals.as_ref().map_or(0, |t| t.rows)
        );
        summary
    }

    /// Whether the filter matched no records at all.
    pub fn is_empty(&self) -> bool {
        self.totals.is_none()
    }
}

fn ok_or_empty<T>(result: Result<T, AggregateError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(AggregateError::EmptyResult) => None,
    }
}
