use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use log::warn;

use crate::data::FilterSpec;
use crate::stats::DashboardSummary;

use super::app::SharedState;
use super::error::ApiError;
use super::page;

/// Raw query pairs; repeated keys (`category=a&category=b`) are kept.
type QueryPairs = Query<Vec<(String, String)>>;

/// Render the dashboard for the requested filter. Every request recomputes
/// all views from the table.
pub async fn dashboard(State(state): State<SharedState>, Query(pairs): QueryPairs) -> Html<String> {
    let (filter, invalid) = state.resolve_filter(&pairs);
    if let Some(err) = &invalid {
        warn!("Ignoring invalid filter input: {err}");
    }

    let summary = DashboardSummary::compute(&state.table, &filter, state.dashboard.top_n);
    Html(page::render(&state, &summary, invalid.as_ref()))
}

/// The dashboard's aggregates as JSON.
pub async fn summary(
    State(state): State<SharedState>,
    Query(pairs): QueryPairs,
) -> Result<Json<DashboardSummary>, ApiError> {
    let filter = FilterSpec::from_query(&pairs)?;
    Ok(Json(DashboardSummary::compute(
        &state.table,
        &filter,
        state.dashboard.top_n,
    )))
}

pub async fn health() -> &'static str {
    "OK"
}
