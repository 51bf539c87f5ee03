//! Web module - browser dashboard served over HTTP

mod app;
mod chart_viewer;
mod control_panel;
mod error;
mod format;
mod handlers;
mod page;

pub use app::{create_router, serve, AppState, SharedState};
pub use chart_viewer::{EMPTY_CUSTOMERS, EMPTY_ORDERS};
pub use error::ApiError;
pub use format::{format_money, format_number};
pub use page::INVALID_FILTER_NOTICE;
