//! Chart Plotter Module
//! Renders dashboard charts to SVG strings with plotters.

use chrono::NaiveDate;
use plotters::prelude::*;
use thiserror::Error;

/// Color of the leading bar in ranked charts (#72BCD4).
pub const HIGHLIGHT_COLOR: RGBColor = RGBColor(114, 188, 212);
/// Color of the remaining bars (#D3D3D3).
pub const MUTED_COLOR: RGBColor = RGBColor(211, 211, 211);
/// Trend line color (#90CAF9).
pub const LINE_COLOR: RGBColor = RGBColor(144, 202, 249);

const FONT: &str = "sans-serif";

#[derive(Error, Debug, PartialEq)]
pub enum ChartError {
    #[error("No data to plot")]
    NoData,
    #[error("Chart rendering failed: {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

/// Creates the dashboard's SVG charts.
pub struct ChartPlotter;

impl ChartPlotter {
    pub const LINE_SIZE: (u32, u32) = (960, 380);
    pub const BAR_SIZE: (u32, u32) = (560, 320);

    /// Line chart of a daily series with a marker on every day.
    pub fn line_chart(
        title: &str,
        y_desc: &str,
        points: &[(NaiveDate, f64)],
        size: (u32, u32),
    ) -> Result<String, ChartError> {
        let (Some(&(start, _)), Some(&(last, _))) = (points.first(), points.last()) else {
            return Err(ChartError::NoData);
        };
        // A single day still needs a non-empty axis.
        let end = if last > start {
            last
        } else {
            start.succ_opt().unwrap_or(start)
        };
        let y_max = Self::axis_max(points.iter().map(|&(_, v)| v));

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT, 20))
                .margin(15)
                .x_label_area_size(35)
                .y_label_area_size(60)
                .build_cartesian_2d(start..end, 0f64..y_max)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&|d: &NaiveDate| d.format("%Y-%m-%d").to_string())
                .y_desc(y_desc)
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    LINE_COLOR.stroke_width(2),
                ))
                .map_err(render_err)?;
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&(d, v)| Circle::new((d, v), 3, LINE_COLOR.filled())),
                )
                .map_err(render_err)?;

            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }

    /// Horizontal bar chart, first bar on top and highlighted.
    pub fn bar_chart(
        title: &str,
        x_desc: &str,
        bars: &[(String, f64)],
        size: (u32, u32),
    ) -> Result<String, ChartError> {
        if bars.is_empty() {
            return Err(ChartError::NoData);
        }
        let n = bars.len();
        let x_max = Self::axis_max(bars.iter().map(|(_, v)| *v));

        let label_for = |segment: &SegmentValue<usize>| Self::bar_label(bars, segment);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, (FONT, 20))
                .margin(15)
                .x_label_area_size(35)
                .y_label_area_size(170)
                .build_cartesian_2d(0f64..x_max, (0usize..n).into_segmented())
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_labels(n)
                .y_label_formatter(&label_for)
                .x_desc(x_desc)
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
                    let color = if i == 0 { HIGHLIGHT_COLOR } else { MUTED_COLOR };
                    let segment = n - 1 - i;
                    let mut bar = Rectangle::new(
                        [
                            (0.0, SegmentValue::Exact(segment)),
                            (*value, SegmentValue::Exact(segment + 1)),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(4, 4, 0, 0);
                    bar
                }))
                .map_err(render_err)?;

            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }

    /// Label of the bar drawn in `segment`. Segment 0 is at the bottom, so
    /// bar i sits in segment n - 1 - i.
    fn bar_label(bars: &[(String, f64)], segment: &SegmentValue<usize>) -> String {
        let n = bars.len();
        match segment {
            SegmentValue::CenterOf(j) if *j < n => bars[n - 1 - j].0.clone(),
            _ => String::new(),
        }
    }

    /// Upper axis bound with 10% headroom; 1.0 when every value is zero.
    fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
        let max = values.fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_have_no_chart() {
        assert_eq!(
            ChartPlotter::line_chart("Daily", "Orders", &[], ChartPlotter::LINE_SIZE),
            Err(ChartError::NoData)
        );
        assert_eq!(
            ChartPlotter::bar_chart("Best", "Revenue", &[], ChartPlotter::BAR_SIZE),
            Err(ChartError::NoData)
        );
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn bars() -> Vec<(String, f64)> {
        vec![
            ("bed_bath_table".to_string(), 300.0),
            ("toys".to_string(), 120.0),
            ("watches_gifts".to_string(), 40.0),
        ]
    }

    #[test]
    fn test_line_chart_renders_svg() {
        let points = [
            (date("2018-01-01"), 3.0),
            (date("2018-01-02"), 0.0),
            (date("2018-01-03"), 5.0),
        ];
        let svg = ChartPlotter::line_chart("Orders per Day", "Orders", &points, ChartPlotter::LINE_SIZE)
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Orders per Day"));
    }

    #[test]
    fn test_line_chart_single_day() {
        let svg = ChartPlotter::line_chart(
            "Orders per Day",
            "Orders",
            &[(date("2018-01-01"), 2.0)],
            ChartPlotter::LINE_SIZE,
        )
        .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_bar_chart_renders_labels() {
        let svg = ChartPlotter::bar_chart("Best", "Revenue", &bars(), ChartPlotter::BAR_SIZE).unwrap();

        assert!(svg.starts_with("<svg"));
        for (label, _) in bars() {
            assert!(svg.contains(&label), "missing label {label}");
        }
        assert!(svg.matches("<rect").count() >= bars().len());
    }

    #[test]
    fn test_bar_label_puts_first_bar_on_top() {
        let bars = bars();
        assert_eq!(ChartPlotter::bar_label(&bars, &SegmentValue::CenterOf(2)), "bed_bath_table");
        assert_eq!(ChartPlotter::bar_label(&bars, &SegmentValue::CenterOf(1)), "toys");
        assert_eq!(ChartPlotter::bar_label(&bars, &SegmentValue::CenterOf(0)), "watches_gifts");
        assert_eq!(ChartPlotter::bar_label(&bars, &SegmentValue::CenterOf(3)), "");
        assert_eq!(ChartPlotter::bar_label(&bars, &SegmentValue::Exact(1)), "");
    }

    #[test]
    fn test_axis_max_headroom() {
        assert_eq!(ChartPlotter::axis_max([0.0, 0.0].into_iter()), 1.0);
        assert!((ChartPlotter::axis_max([2.0, 10.0].into_iter()) - 11.0).abs() < 1e-9);
    }
}
