//! Statistics module - filtering, grouping and descriptive statistics

pub mod aggregator;
pub mod calculator;
pub mod rfm;
mod summary;

pub use aggregator::{
    aggregate, customers_by_region, daily_series, totals, AggregateError, AggregateResult,
    DailyPoint, GroupBy, GroupMetrics, Metric, Ranking, RegionCustomers, Totals,
};
pub use calculator::{Descriptive, StatsCalculator};
pub use rfm::{rfm_analysis, CustomerRfm, RfmSummary};
pub use summary::{CategoryPerformance, DashboardSummary, RfmHighlights};
