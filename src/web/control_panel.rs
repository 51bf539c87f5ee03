//! Control Panel
//! Sidebar filter form. Changing any input resubmits the form, which
//! recomputes the whole dashboard.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data::{FilterSpec, Table};

use super::format::escape;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn render(table: &Table, filter: &FilterSpec) -> String {
    let span = table.date_span();
    let (start, end) = shown_range(span, filter);

    let mut html = String::from(r#"<form method="get" action="/" class="filters">"#);
    html.push_str("<h2>Filters</h2>");

    html.push_str(&date_input("start", "From", start, span));
    html.push_str(&date_input("end", "To", end, span));
    html.push_str(&multi_select(
        "category",
        "Category",
        table.categories(),
        filter.categories.as_ref(),
    ));
    html.push_str(&multi_select(
        "region",
        "Region",
        table.regions(),
        filter.regions.as_ref(),
    ));

    html.push_str(
        r#"<div class="actions"><button type="submit">Apply</button> <a href="/">Reset</a></div>"#,
    );
    html.push_str("</form>");
    html
}

/// Dates shown in the inputs: the filter's bounds, with open bounds
/// replaced by the table's span.
fn shown_range(
    span: Option<(NaiveDate, NaiveDate)>,
    filter: &FilterSpec,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let (span_start, span_end) = span.unzip();
    (filter.start.or(span_start), filter.end.or(span_end))
}

fn date_input(
    name: &str,
    label: &str,
    value: Option<NaiveDate>,
    span: Option<(NaiveDate, NaiveDate)>,
) -> String {
    let fmt = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
    let mut attrs = String::new();
    if let Some((min, max)) = span {
        attrs.push_str(&format!(r#" min="{}" max="{}""#, fmt(min), fmt(max)));
    }
    if let Some(value) = value {
        attrs.push_str(&format!(r#" value="{}""#, fmt(value)));
    }

    format!(
        r#"<label for="{name}">{label}</label><input type="date" id="{name}" name="{name}"{attrs} onchange="this.form.submit()">"#
    )
}

fn multi_select(
    name: &str,
    label: &str,
    options: &BTreeSet<String>,
    selected: Option<&BTreeSet<String>>,
) -> String {
    let size = options.len().clamp(2, 8);
    let mut html = format!(
        r#"<label for="{name}">{label}</label><select id="{name}" name="{name}" multiple size="{size}" onchange="this.form.submit()">"#
    );
    for option in options {
        let is_selected = selected.is_some_and(|s| s.contains(option));
        let value = escape(option);
        html.push_str(&format!(
            r#"<option value="{value}"{}>{value}</option>"#,
            if is_selected { " selected" } else { "" }
        ));
    }
    html.push_str("</select>");
    html
}
