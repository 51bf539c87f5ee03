//! Full dashboard page: sidebar, warning banner and sections.

use crate::data::FilterError;
use crate::stats::DashboardSummary;

use super::app::AppState;
use super::format::{escape, format_number};
use super::{chart_viewer, control_panel};

const STYLE: &str = r#"
body { margin: 0; font-family: sans-serif; display: flex; background: #f7f9fb; color: #222; }
aside { width: 260px; padding: 16px; background: #eef2f6; min-height: 100vh; box-sizing: border-box; }
aside label { display: block; margin: 12px 0 4px; font-weight: bold; }
aside input, aside select { width: 100%; }
aside .actions { margin-top: 16px; }
main { flex: 1; padding: 16px 32px; }
section { background: #fff; border-radius: 6px; padding: 8px 16px 16px; margin-bottom: 20px; }
.metrics, .row { display: flex; flex-wrap: wrap; gap: 16px; }
.metric { display: flex; flex-direction: column; padding: 8px 16px; }
.metric .label { color: #666; font-size: 0.9em; }
.metric .value { font-size: 1.8em; }
.chart { margin: 8px 0; }
.empty, .note { color: #666; font-style: italic; }
.warning { background: #fff3cd; border: 1px solid #ffe08a; padding: 8px 16px; border-radius: 6px; }
table { border-collapse: collapse; }
th, td { padding: 4px 12px; border-bottom: 1px solid #ddd; text-align: right; }
th:first-child, td:first-child { text-align: left; }
footer { color: #888; font-size: 0.8em; }
"#;

pub const INVALID_FILTER_NOTICE: &str = "Invalid filter ignored, showing the previous selection";

pub fn render(state: &AppState, summary: &DashboardSummary, invalid: Option<&FilterError>) -> String {
    let title = escape(&state.dashboard.title);
    let matching = summary.totals.as_ref().map_or(0, |t| t.rows);

    let mut html = format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>{title}</title><style>{STYLE}</style></head><body>"#
    );
    html.push_str("<aside>");
    html.push_str(&control_panel::render(&state.table, &summary.filter));
    html.push_str("</aside><main>");
    html.push_str(&format!("<h1>{title}</h1>"));

    if let Some(err) = invalid {
        html.push_str(&format!(
            r#"<p class="warning">{INVALID_FILTER_NOTICE}: {}</p>"#,
            escape(&err.to_string())
        ));
    }

    html.push_str(&format!(
        r#"<p class="status">Showing {} of {} order lines</p>"#,
        format_number(matching as f64, 0),
        format_number(state.table.len() as f64, 0)
    ));
    html.push_str(&chart_viewer::render(summary, &state.dashboard));
    html.push_str("<footer>Generated from the loaded order dataset</footer>");
    html.push_str("</main></body></html>");
    html
}
