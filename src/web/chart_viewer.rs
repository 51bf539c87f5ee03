//! Chart Viewer
//! Dashboard sections: headline metrics, charts and the category table.

use log::warn;

use crate::charts::{ChartError, ChartPlotter};
use crate::config::DashboardConfig;
use crate::stats::{AggregateResult, CustomerRfm, DashboardSummary};

use super::format::{escape, format_money, format_number};

pub const EMPTY_ORDERS: &str = "No orders match the selected filters.";
pub const EMPTY_CUSTOMERS: &str = "No customer information for the selected filters.";

pub fn render(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    [
        daily_section(summary, config),
        category_section(summary, config),
        category_table_section(summary, config),
        region_section(summary, config),
        demographics_section(summary),
        rfm_section(summary, config),
    ]
    .concat()
}

fn section(title: &str, body: &str) -> String {
    format!(
        r#"<section><h2>{}</h2>{body}</section>"#,
        escape(title)
    )
}

fn empty_state(message: &str) -> String {
    format!(r#"<p class="empty">{}</p>"#, escape(message))
}

fn metric(label: &str, value: &str) -> String {
    format!(
        r#"<div class="metric"><span class="label">{}</span><span class="value">{}</span></div>"#,
        escape(label),
        escape(value)
    )
}

/// Inline a rendered chart, or a note when it could not be drawn.
fn chart(name: &str, rendered: Result<String, ChartError>) -> String {
    match rendered {
        Ok(svg) => format!(r#"<figure class="chart">{svg}</figure>"#),
        Err(err) => {
            warn!("Chart '{name}' unavailable: {err}");
            format!(
                r#"<p class="note">Chart unavailable: {}</p>"#,
                escape(&err.to_string())
            )
        }
    }
}

fn daily_section(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    let title = "Daily Orders & Revenue";
    let (Some(totals), Some(daily)) = (&summary.totals, &summary.daily) else {
        return section(title, &empty_state(EMPTY_ORDERS));
    };

    let points: Vec<_> = daily.iter().map(|p| (p.date, p.orders as f64)).collect();
    let body = format!(
        r#"<div class="metrics">{}{}</div>{}"#,
        metric("Total Orders", &format_number(totals.orders as f64, 0)),
        metric("Total Revenue", &format_money(totals.revenue, &config.currency)),
        chart(
            "daily orders",
            ChartPlotter::line_chart("Orders per Day", "Orders", &points, ChartPlotter::LINE_SIZE),
        )
    );
    section(title, &body)
}

fn category_section(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    let title = "Best & Worst Performing Product (By Revenue)";
    let Some(performance) = &summary.category_performance else {
        return section(title, &empty_state(EMPTY_ORDERS));
    };

    let x_desc = format!("Total Revenue ({})", config.currency);
    let body = format!(
        r#"<div class="row">{}{}</div>"#,
        chart(
            "best categories",
            ChartPlotter::bar_chart(
                "Best Performing Product",
                &x_desc,
                &performance.best,
                ChartPlotter::BAR_SIZE
            ),
        ),
        chart(
            "worst categories",
            ChartPlotter::bar_chart(
                "Worst Performing Product",
                &x_desc,
                &performance.worst,
                ChartPlotter::BAR_SIZE
            ),
        )
    );
    section(title, &body)
}

fn category_table_section(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    let title = "Revenue by Category";
    match &summary.by_category {
        Some(result) => section(title, &group_table("Category", result, config)),
        None => section(title, &empty_state(EMPTY_ORDERS)),
    }
}

fn region_section(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    let title = "Orders & Revenue by Region";
    let (Some(top), Some(result)) = (&summary.top_regions, &summary.by_region) else {
        return section(title, &empty_state(EMPTY_ORDERS));
    };

    let bars: Vec<(String, f64)> = top.iter().map(|(r, n)| (r.clone(), *n as f64)).collect();
    let body = format!(
        "{}{}",
        chart(
            "top regions",
            ChartPlotter::bar_chart("Regions by Orders", "Orders", &bars, ChartPlotter::BAR_SIZE),
        ),
        group_table("Region", result, config)
    );
    section(title, &body)
}

/// Per-group metrics as a table; `label` heads the key column.
fn group_table(label: &str, result: &AggregateResult, config: &DashboardConfig) -> String {
    let mut html = format!(
        "<table><thead><tr><th>{}</th><th>Items</th><th>Orders</th><th>Quantity</th>\
         <th>Revenue</th><th>Mean</th><th>Median</th><th>Std Dev</th></tr></thead><tbody>",
        escape(label)
    );
    for (key, m) in &result.groups {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(key),
            m.count,
            m.orders,
            m.quantity,
            escape(&format_money(m.sum, &config.currency)),
            format_number(m.mean, 2),
            format_number(m.median, 2),
            format_number(m.std, 2),
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn demographics_section(summary: &DashboardSummary) -> String {
    let title = "Customer Demographics";
    let Some(regions) = &summary.customers_by_region else {
        return section(title, &empty_state(EMPTY_CUSTOMERS));
    };

    let bars: Vec<(String, f64)> = regions
        .iter()
        .map(|r| (r.region.clone(), r.customers as f64))
        .collect();
    let body = chart(
        "customers by region",
        ChartPlotter::bar_chart(
            "Number of Customers by Region",
            "Customers",
            &bars,
            ChartPlotter::BAR_SIZE,
        ),
    );
    section(title, &body)
}

fn rfm_section(summary: &DashboardSummary, config: &DashboardConfig) -> String {
    let title = "Best Customer Based on RFM Parameters";
    let Some(rfm) = &summary.rfm else {
        return section(title, &empty_state(EMPTY_CUSTOMERS));
    };

    let body = format!(
        r#"<div class="metrics">{}{}{}</div><div class="row">{}{}{}</div>"#,
        metric("Average Recency (days)", &format_number(rfm.avg_recency, 1)),
        metric("Average Frequency", &format_number(rfm.avg_frequency, 2)),
        metric("Average Monetary", &format_money(rfm.avg_monetary, &config.currency)),
        chart(
            "rfm recency",
            ChartPlotter::bar_chart(
                "By Recency (lower is better)",
                "Days",
                &customer_bars(&rfm.by_recency, |c| c.recency as f64),
                ChartPlotter::BAR_SIZE,
            ),
        ),
        chart(
            "rfm frequency",
            ChartPlotter::bar_chart(
                "By Frequency",
                "Orders",
                &customer_bars(&rfm.by_frequency, |c| c.frequency as f64),
                ChartPlotter::BAR_SIZE,
            ),
        ),
        chart(
            "rfm monetary",
            ChartPlotter::bar_chart(
                "By Monetary",
                &config.currency,
                &customer_bars(&rfm.by_monetary, |c| c.monetary),
                ChartPlotter::BAR_SIZE,
            ),
        ),
    );
    section(title, &body)
}

fn customer_bars(list: &[CustomerRfm], value: fn(&CustomerRfm) -> f64) -> Vec<(String, f64)> {
    list.iter()
        .map(|c| (c.customer_id.clone(), value(c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::{FilterSpec, Table};

    fn table() -> Table {
        Table::from_records(vec![
            record("o1", "2018-01-01 09:00:00", "A", "rio", 10.0),
            record("o2", "2018-01-02 09:00:00", "B<script>", "rio", 5.0),
        ])
    }

    #[test]
    fn test_chart_failure_renders_note() {
        let html = chart("daily orders", Err(ChartError::Render("no fonts".to_string())));
        assert_eq!(
            html,
            r#"<p class="note">Chart unavailable: Chart rendering failed: no fonts</p>"#
        );

        let html = chart("daily orders", Err(ChartError::NoData));
        assert!(html.contains("Chart unavailable: No data to plot"));
    }

    #[test]
    fn test_chart_success_is_inlined() {
        let html = chart("daily orders", Ok("<svg></svg>".to_string()));
        assert_eq!(html, r#"<figure class="chart"><svg></svg></figure>"#);
    }

    #[test]
    fn test_category_table_rows() {
        let summary = DashboardSummary::compute(&table(), &FilterSpec::all(), 5);
        let html = group_table(
            "Category",
            summary.by_category.as_ref().unwrap(),
            &DashboardConfig::default(),
        );

        assert!(html.contains("<th>Category</th>"));
        assert!(html.contains(
            "<tr><td>A</td><td>1</td><td>1</td><td>1</td><td>AUD 10.00</td><td>10.00</td><td>10.00</td><td>0.00</td></tr>"
        ));
        assert!(html.contains("B&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_summary_renders_empty_states() {
        let filter = FilterSpec::all().with_categories(["missing"]);
        let summary = DashboardSummary::compute(&table(), &filter, 5);
        let html = render(&summary, &DashboardConfig::default());

        assert_eq!(html.matches(EMPTY_ORDERS).count(), 4);
        assert_eq!(html.matches(EMPTY_CUSTOMERS).count(), 2);
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn test_customer_sections_empty_without_customer_ids() {
        let summary = DashboardSummary::compute(&table(), &FilterSpec::all(), 5);
        let html = render(&summary, &DashboardConfig::default());

        assert!(html.contains("Total Orders"));
        assert!(html.contains("<th>Region</th>"));
        assert!(!html.contains(EMPTY_ORDERS));
        assert_eq!(html.matches(EMPTY_CUSTOMERS).count(), 2);
    }
}
