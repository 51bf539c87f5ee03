//! Dashboard server: shared state, router and serve loop.

use std::sync::{Arc, Mutex, PoisonError};

use axum::routing::get;
use axum::Router;
use log::info;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::DashboardConfig;
use crate::data::{FilterError, FilterSpec, Table};

use super::handlers;

/// Shared application state for HTTP handlers.
pub struct AppState {
    pub table: Arc<Table>,
    pub dashboard: DashboardConfig,
    /// Last filter successfully applied to the dashboard page; invalid input
    /// falls back to it.
    last_valid: Mutex<FilterSpec>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(table: Arc<Table>, dashboard: DashboardConfig) -> Self {
        Self {
            table,
            dashboard,
            last_valid: Mutex::new(FilterSpec::all()),
        }
    }

    /// Parse the query into a filter. A valid filter becomes the new
    /// fallback; an invalid one is reported alongside the previous fallback.
    pub fn resolve_filter(&self, pairs: &[(String, String)]) -> (FilterSpec, Option<FilterError>) {
        let mut last_valid = self
            .last_valid
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match FilterSpec::from_query(pairs) {
            Ok(filter) => {
                *last_valid = filter.clone();
                (filter, None)
            }
            Err(err) => (last_valid.clone(), Some(err)),
        }
    }
}

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/summary", get(handlers::summary))
        .route("/health", get(handlers::health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: SharedState, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}
