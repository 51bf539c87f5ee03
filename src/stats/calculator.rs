//! Statistics Calculator Module
//! Descriptive statistics over the order amounts of one group.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Summary of a set of order amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Descriptive {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            mean: 0.0,
            median: 0.0,
            std: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// An empty slice yields all zeros so that every reported metric stays
    /// finite and non-negative for non-negative input.
    pub fn describe(values: &[f64]) -> Descriptive {
        let n = values.len();
        if n == 0 {
            return Descriptive::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let sum: f64 = values.iter().sum();
        let std = if n > 1 {
            Statistics::std_dev(values)
        } else {
            0.0
        };

        Descriptive {
            count: n,
            sum,
            mean: sum / n as f64,
            median: Self::percentile(&sorted, 50.0),
            std,
            min: Statistics::min(values),
            max: Statistics::max(values),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
