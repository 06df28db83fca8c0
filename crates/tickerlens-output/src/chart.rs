//! Dual-series line chart of annual returns.
//!
//! A [`LineChart`] is plain data: a title, axis labels, the x values (years)
//! and one or more series aligned with them. Gaps (`None`) break the line.
//! The chart can be written as a self-contained SVG or as a Plotly figure.

use crate::format::percent;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tickerlens_returns::ComparisonSeries;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;
const Y_TICKS: usize = 5;
const SUBJECT_COLOR: &str = "blue";
const BENCHMARK_COLOR: &str = "green";
const GRID_COLOR: &str = "#444";
const TEXT_COLOR: &str = "#ddd";
const BACKGROUND: &str = "#111";

/// Errors that can occur while writing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SVG formatting error.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// One named line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    /// Legend label
    pub name: String,
    /// Stroke color (any SVG/CSS color)
    pub color: String,
    /// Values aligned with the chart's x values; `None` is a gap
    pub values: Vec<Option<f64>>,
}

/// Line chart with a shared x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    /// Chart title
    pub title: String,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
    /// X values, ascending
    pub x: Vec<i32>,
    /// Series drawn on the chart
    pub series: Vec<LineSeries>,
}

impl LineChart {
    /// Chart of subject vs benchmark annual returns.
    ///
    /// The subject series is named after its ticker and the benchmark after
    /// `benchmark_label`; undefined or missing years are gaps.
    pub fn annual_returns(comparison: &ComparisonSeries, benchmark_label: &str) -> Self {
        Self {
            title: format!(
                "Annual Stock Returns vs {} (Percentage Return)",
                benchmark_label
            ),
            x_label: "Year".to_string(),
            y_label: "Percentage Return".to_string(),
            x: comparison.years(),
            series: vec![
                LineSeries {
                    name: format!("{} Performance", comparison.subject_symbol),
                    color: SUBJECT_COLOR.to_string(),
                    values: comparison.subject_values(),
                },
                LineSeries {
                    name: format!("{} Performance", benchmark_label),
                    color: BENCHMARK_COLOR.to_string(),
                    values: comparison.benchmark_values(),
                },
            ],
        }
    }

    /// Plotly figure (`data` + `layout`) with one `lines` trace per series.
    pub fn to_plotly_json(&self) -> Value {
        let traces: Vec<Value> = self
            .series
            .iter()
            .map(|s| {
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": s.name,
                    "x": self.x,
                    "y": s.values,
                    "line": {"color": s.color},
                })
            })
            .collect();

        json!({
            "data": traces,
            "layout": {
                "title": {"text": self.title},
                "xaxis": {"title": {"text": self.x_label}},
                "yaxis": {"title": {"text": self.y_label}},
                "hovermode": "x unified",
                "template": "plotly_dark",
            },
        })
    }

    /// Render a standalone SVG document.
    pub fn to_svg(&self) -> Result<String, ChartError> {
        let (y_min, y_max) = self.y_range();
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let x_of = |index: usize| {
            if self.x.len() <= 1 {
                MARGIN_LEFT + plot_w / 2.0
            } else {
                MARGIN_LEFT + plot_w * index as f64 / (self.x.len() - 1) as f64
            }
        };
        let y_of = |value: f64| MARGIN_TOP + plot_h * (y_max - value) / (y_max - y_min);

        let mut svg = String::new();
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
            w = WIDTH,
            h = HEIGHT
        )?;
        write!(
            svg,
            r#"<style>text{{font-family:Arial,sans-serif;font-size:11px;fill:{}}}</style>"#,
            TEXT_COLOR
        )?;
        write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            BACKGROUND
        )?;
        write!(
            svg,
            r#"<text x="{:.1}" y="24" text-anchor="middle" style="font-size:15px">{}</text>"#,
            WIDTH / 2.0,
            escape_xml(&self.title)
        )?;

        // Horizontal grid with percentage labels
        for tick in 0..=Y_TICKS {
            let value = y_min + (y_max - y_min) * tick as f64 / Y_TICKS as f64;
            let y = y_of(value);
            write!(
                svg,
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="0.5"/>"#,
                MARGIN_LEFT,
                WIDTH - MARGIN_RIGHT,
                GRID_COLOR,
            )?;
            write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                escape_xml(&percent(value))
            )?;
        }

        if y_min < 0.0 && y_max > 0.0 {
            let y = y_of(0.0);
            write!(
                svg,
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-dasharray="4 3"/>"#,
                MARGIN_LEFT,
                WIDTH - MARGIN_RIGHT,
                TEXT_COLOR,
            )?;
        }

        for (index, year) in self.x.iter().enumerate() {
            write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
                x_of(index),
                HEIGHT - MARGIN_BOTTOM + 18.0,
                year
            )?;
        }

        write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + plot_w / 2.0,
            HEIGHT - 12.0,
            escape_xml(&self.x_label)
        )?;
        write!(
            svg,
            r#"<text x="16" y="{y:.1}" text-anchor="middle" transform="rotate(-90 16 {y:.1})">{}</text>"#,
            escape_xml(&self.y_label),
            y = MARGIN_TOP + plot_h / 2.0
        )?;

        for series in &self.series {
            let mut path = String::new();
            let mut pen_down = false;
            for (index, value) in series.values.iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => {
                        let command = if pen_down { 'L' } else { 'M' };
                        write!(path, "{}{:.1},{:.1} ", command, x_of(index), y_of(*v))?;
                        pen_down = true;
                    }
                    _ => pen_down = false,
                }
            }
            if !path.is_empty() {
                write!(
                    svg,
                    r#"<path d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
                    path.trim_end(),
                    escape_xml(&series.color)
                )?;
            }
            for (index, value) in series.values.iter().enumerate() {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    write!(
                        svg,
                        r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"/>"#,
                        x_of(index),
                        y_of(v),
                        escape_xml(&series.color)
                    )?;
                }
            }
        }

        for (slot, series) in self.series.iter().enumerate() {
            let y = MARGIN_TOP + 8.0 + slot as f64 * 16.0;
            let x = MARGIN_LEFT + 12.0;
            write!(
                svg,
                r#"<line x1="{x:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"/>"#,
                x + 18.0,
                escape_xml(&series.color)
            )?;
            write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
                x + 24.0,
                y + 4.0,
                escape_xml(&series.name)
            )?;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    /// Write the SVG rendering to `path`.
    pub fn save_svg(&self, path: &Path) -> Result<(), ChartError> {
        fs::write(path, self.to_svg()?)?;
        Ok(())
    }

    /// Write the pretty-printed Plotly figure to `path`.
    pub fn save_plotly(&self, path: &Path) -> Result<(), ChartError> {
        fs::write(path, serde_json::to_string_pretty(&self.to_plotly_json())?)?;
        Ok(())
    }

    /// Y axis bounds covering every defined value and zero.
    fn y_range(&self) -> (f64, f64) {
        let (min, max) = self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

        if max - min < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            let pad = (max - min) * 0.05;
            (min - pad, max + pad)
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlens_returns::{AnnualReturns, ReturnError, compare_returns};

    fn comparison() -> ComparisonSeries {
        let mut subject = AnnualReturns::new("AAPL");
        subject.insert(2020, Ok(80.0));
        subject.insert(2021, Err(ReturnError::DivisionByZero { year: 2021 }));
        subject.insert(2022, Ok(-27.0));
        let mut benchmark = AnnualReturns::new("^GSPC");
        benchmark.insert(2021, Ok(27.0));
        benchmark.insert(2022, Ok(-19.0));
        benchmark.insert(2023, Ok(24.0));
        compare_returns(&subject, &benchmark)
    }

    #[test]
    fn test_annual_returns_chart() {
        let chart = LineChart::annual_returns(&comparison(), "S&P 500");

        assert_eq!(chart.title, "Annual Stock Returns vs S&P 500 (Percentage Return)");
        assert_eq!(chart.x_label, "Year");
        assert_eq!(chart.y_label, "Percentage Return");
        assert_eq!(chart.x, vec![2020, 2021, 2022, 2023]);
        assert_eq!(chart.series[0].name, "AAPL Performance");
        assert_eq!(
            chart.series[0].values,
            vec![Some(80.0), None, Some(-27.0), None]
        );
        assert_eq!(chart.series[1].name, "S&P 500 Performance");
        assert_eq!(
            chart.series[1].values,
            vec![None, Some(27.0), Some(-19.0), Some(24.0)]
        );
    }

    #[test]
    fn test_plotly_json() {
        let figure = LineChart::annual_returns(&comparison(), "S&P 500").to_plotly_json();

        assert_eq!(figure["data"].as_array().unwrap().len(), 2);
        assert_eq!(figure["data"][0]["mode"], "lines");
        assert_eq!(figure["data"][0]["line"]["color"], "blue");
        assert_eq!(figure["data"][1]["line"]["color"], "green");
        assert!(figure["data"][0]["y"][1].is_null());
        assert_eq!(figure["data"][1]["x"][3], 2023);
        assert_eq!(figure["layout"]["hovermode"], "x unified");
        assert_eq!(figure["layout"]["template"], "plotly_dark");
        assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "Year");
    }

    #[test]
    fn test_svg_escapes_and_breaks_lines() {
        let svg = LineChart::annual_returns(&comparison(), "S&P 500")
            .to_svg()
            .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("S&amp;P 500 Performance"));
        assert!(!svg.contains("S&P"));
        // subject has two isolated points: two separate moves, no line segment
        let subject_path = svg
            .split("<path d=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap();
        assert_eq!(subject_path.matches('M').count(), 2);
        assert_eq!(subject_path.matches('L').count(), 0);
        assert_eq!(svg.matches("<circle").count(), 5);
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }

    #[test]
    fn test_empty_chart_renders() {
        let empty = compare_returns(&AnnualReturns::new("AAPL"), &AnnualReturns::new("^GSPC"));
        let chart = LineChart::annual_returns(&empty, "S&P 500");

        let svg = chart.to_svg().unwrap();
        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<circle"));
        assert_eq!(chart.to_plotly_json()["data"][0]["x"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_y_range_includes_zero() {
        let chart = LineChart {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            x: vec![2020, 2021],
            series: vec![LineSeries {
                name: "A".to_string(),
                color: "red".to_string(),
                values: vec![Some(10.0), Some(20.0)],
            }],
        };

        let (min, max) = chart.y_range();
        assert!(min < 0.0);
        assert!(max > 20.0);
    }
}
