//! Storefront Dashboard - e-commerce order data explorer
//!
//! Loads order CSV files into a [`data::Table`], aggregates them under a
//! [`data::FilterSpec`] and serves the results as a browser dashboard.

pub mod charts;
pub mod cli;
pub mod config;
pub mod data;
pub mod logger;
pub mod stats;
pub mod web;
