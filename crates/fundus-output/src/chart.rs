//! Scatter, 3D scatter and bubble charts over chosen indicators.
//!
//! Charts are emitted as a Plotly figure (JSON with `data` and `layout`) or as
//! a standalone HTML page that loads plotly.js from its CDN.

use crate::table::{RatioTable, TableError};
use fundus_ratios::get_indicator_info;
use serde_json::{Value, json};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Largest bubble diameter in pixels.
const MAX_BUBBLE_PX: f64 = 40.0;

/// Errors raised while building or writing a chart.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Indicator name not in the registry.
    #[error("Unknown indicator: {0}")]
    UnknownIndicator(String),

    /// 3D scatter and bubble charts need a third indicator.
    #[error("{0} chart requires a third indicator")]
    MissingThirdIndicator(ChartKind),

    /// Every ticker had a null or non-finite value.
    #[error("No ticker has finite values for all selected indicators")]
    NoPlottablePoints,

    /// Table error.
    #[error(transparent)]
    Table(#[from] TableError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Chart type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    /// Two-indicator scatter; an optional third indicator colours the markers.
    #[default]
    Scatter,

    /// Three-indicator 3D scatter.
    Scatter3d,

    /// Two-indicator scatter with marker area scaled by a third indicator.
    Bubble,
}

impl ChartKind {
    /// Canonical name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scatter => "scatter",
            Self::Scatter3d => "scatter3d",
            Self::Bubble => "bubble",
        }
    }

    /// Whether the kind needs a third indicator.
    pub const fn requires_third(&self) -> bool {
        matches!(self, Self::Scatter3d | Self::Bubble)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "scatter" | "2d" => Ok(Self::Scatter),
            "scatter3d" | "scatter-3d" | "3d" => Ok(Self::Scatter3d),
            "bubble" => Ok(Self::Bubble),
            other => Err(format!("unknown chart kind: {other}")),
        }
    }
}

/// Which indicators to plot and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    /// Chart type.
    pub kind: ChartKind,
    /// Horizontal axis indicator.
    pub x: String,
    /// Vertical axis indicator.
    pub y: String,
    /// Depth axis (3D), marker size (bubble) or marker colour (scatter).
    pub third: Option<String>,
}

impl ChartSpec {
    /// Create a spec without a third indicator.
    pub fn new(kind: ChartKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind,
            x: x.into(),
            y: y.into(),
            third: None,
        }
    }

    /// Set the third indicator.
    #[must_use]
    pub fn with_third(mut self, third: impl Into<String>) -> Self {
        self.third = Some(third.into());
        self
    }

    /// Check names against the indicator registry and the kind's arity.
    pub fn validate(&self) -> Result<(), ChartError> {
        for name in self.indicators() {
            if get_indicator_info(name).is_none() {
                return Err(ChartError::UnknownIndicator(name.to_string()));
            }
        }
        if self.kind.requires_third() && self.third.is_none() {
            return Err(ChartError::MissingThirdIndicator(self.kind));
        }
        Ok(())
    }

    /// Selected indicator names, axis order.
    pub fn indicators(&self) -> Vec<&str> {
        let mut names = vec![self.x.as_str(), self.y.as_str()];
        if let Some(third) = &self.third {
            names.push(third);
        }
        names
    }
}

/// One plotted ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Ticker label.
    pub ticker: String,
    /// Horizontal value.
    pub x: f64,
    /// Vertical value.
    pub y: f64,
    /// Third indicator value, when the spec has one.
    pub z: Option<f64>,
}

/// A chart ready to render.
#[derive(Debug, Clone)]
pub struct Chart {
    spec: ChartSpec,
    points: Vec<ChartPoint>,
    skipped: Vec<String>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl Chart {
    /// Collect one point per ticker with finite values for every selected
    /// indicator.
    pub fn build(table: &RatioTable, spec: &ChartSpec) -> Result<Self, ChartError> {
        spec.validate()?;

        let tickers = table.tickers()?;
        let xs = table.column_values(&spec.x)?;
        let ys = table.column_values(&spec.y)?;
        let zs = match &spec.third {
            Some(name) => Some(table.column_values(name)?),
            None => None,
        };

        let mut points = Vec::new();
        let mut skipped = Vec::new();
        for (i, ticker) in tickers.into_iter().enumerate() {
            let x = finite(xs[i]);
            let y = finite(ys[i]);
            let z = zs.as_ref().map(|col| finite(col[i]));
            match (x, y, z) {
                (Some(x), Some(y), None) => points.push(ChartPoint { ticker, x, y, z: None }),
                (Some(x), Some(y), Some(Some(z))) => points.push(ChartPoint {
                    ticker,
                    x,
                    y,
                    z: Some(z),
                }),
                _ => skipped.push(ticker),
            }
        }

        if points.is_empty() {
            return Err(ChartError::NoPlottablePoints);
        }

        Ok(Self {
            spec: spec.clone(),
            points,
            skipped,
        })
    }

    /// Chart spec.
    pub const fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    /// Plotted points, table order.
    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    /// Tickers dropped for null or non-finite values.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    fn title(&self) -> String {
        match (&self.spec.kind, &self.spec.third) {
            (ChartKind::Scatter3d, Some(z)) => format!("{} vs {} vs {}", self.spec.x, self.spec.y, z),
            (ChartKind::Bubble, Some(z)) => {
                format!("{} vs {} (size: {})", self.spec.x, self.spec.y, z)
            }
            (ChartKind::Scatter, Some(z)) => {
                format!("{} vs {} (colour: {})", self.spec.x, self.spec.y, z)
            }
            _ => format!("{} vs {}", self.spec.x, self.spec.y),
        }
    }

    fn thirds(&self) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.z).collect()
    }

    /// Plotly figure with `data` and `layout`.
    pub fn to_plotly_json(&self) -> Value {
        let labels: Vec<&str> = self.points.iter().map(|p| p.ticker.as_str()).collect();
        let xs: Vec<f64> = self.points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = self.points.iter().map(|p| p.y).collect();
        let title = self.title();

        let (trace, layout) = match self.spec.kind {
            ChartKind::Scatter3d => {
                let z_name = self.spec.third.as_deref().unwrap_or_default();
                (
                    json!({
                        "type": "scatter3d",
                        "mode": "markers+text",
                        "x": xs,
                        "y": ys,
                        "z": self.thirds(),
                        "text": labels,
                        "marker": { "size": 6 },
                    }),
                    json!({
                        "title": { "text": title },
                        "scene": {
                            "xaxis": { "title": { "text": self.spec.x } },
                            "yaxis": { "title": { "text": self.spec.y } },
                            "zaxis": { "title": { "text": z_name } },
                        },
                    }),
                )
            }
            ChartKind::Bubble => {
                let sizes: Vec<f64> = self.thirds().into_iter().map(f64::abs).collect();
                let max = sizes.iter().copied().fold(0.0_f64, f64::max);
                let sizeref = if max > 0.0 {
                    2.0 * max / MAX_BUBBLE_PX.powi(2)
                } else {
                    1.0
                };
                (
                    json!({
                        "type": "scatter",
                        "mode": "markers+text",
                        "x": xs,
                        "y": ys,
                        "text": labels,
                        "textposition": "top center",
                        "marker": {
                            "size": sizes,
                            "sizemode": "area",
                            "sizeref": sizeref,
                            "sizemin": 4,
                        },
                    }),
                    self.planar_layout(&title),
                )
            }
            ChartKind::Scatter => {
                let mut marker = json!({ "size": 10 });
                if self.spec.third.is_some() {
                    marker["color"] = json!(self.thirds());
                    marker["colorscale"] = json!("Viridis");
                    marker["showscale"] = json!(true);
                }
                (
                    json!({
                        "type": "scatter",
                        "mode": "markers+text",
                        "x": xs,
                        "y": ys,
                        "text": labels,
                        "textposition": "top center",
                        "marker": marker,
                    }),
                    self.planar_layout(&title),
                )
            }
        };

        json!({ "data": [trace], "layout": layout })
    }

    fn planar_layout(&self, title: &str) -> Value {
        json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": self.spec.x } },
            "yaxis": { "title": { "text": self.spec.y } },
        })
    }

    /// Standalone HTML page rendering the figure.
    pub fn to_html(&self) -> Result<String, ChartError> {
        // `</` would close the script element early.
        let figure = serde_json::to_string(&self.to_plotly_json())?.replace("</", "<\\/");
        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("chart", figure.data, figure.layout);
</script>
</body>
</html>
"#,
            title = html_escape(&self.title()),
        ))
    }

    /// Write the HTML page to `path`.
    pub fn write_html(&self, path: &Path) -> Result<(), ChartError> {
        std::fs::write(path, self.to_html()?)?;
        Ok(())
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fundus_ratios::TickerRatios;
    use rstest::rstest;

    fn row(ticker: &str, roa: Option<f64>, beta: Option<f64>, cap: Option<f64>) -> TickerRatios {
        TickerRatios {
            ticker: ticker.to_string(),
            roa,
            beta,
            market_cap: cap,
            ebit_price_ratio: Some(0.05),
            ..Default::default()
        }
    }

    fn table() -> RatioTable {
        RatioTable::from_rows(&[
            row("AMZN", Some(0.2), Some(1.3), Some(2.0e12)),
            row("MSFT", Some(0.15), None, Some(3.0e12)),
            row("CASH", Some(f64::INFINITY), Some(0.9), Some(1.0e9)),
            row("AAPL", Some(0.25), Some(1.1), Some(-4.0e12)),
        ])
        .unwrap()
    }

    #[rstest]
    #[case("scatter", ChartKind::Scatter)]
    #[case("3d", ChartKind::Scatter3d)]
    #[case("Scatter_3D", ChartKind::Scatter3d)]
    #[case("BUBBLE", ChartKind::Bubble)]
    fn test_kind_from_str(#[case] input: &str, #[case] expected: ChartKind) {
        assert_eq!(input.parse::<ChartKind>().unwrap(), expected);
    }

    #[test]
    fn test_kind_from_str_rejects_unknown() {
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_validate_unknown_indicator() {
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "pe");
        assert!(matches!(
            spec.validate(),
            Err(ChartError::UnknownIndicator(name)) if name == "pe"
        ));
    }

    #[test]
    fn test_validate_ticker_is_not_an_indicator() {
        let spec = ChartSpec::new(ChartKind::Scatter, "ticker", "roa");
        assert!(matches!(spec.validate(), Err(ChartError::UnknownIndicator(_))));
    }

    #[rstest]
    #[case(ChartKind::Scatter3d)]
    #[case(ChartKind::Bubble)]
    fn test_validate_missing_third(#[case] kind: ChartKind) {
        let spec = ChartSpec::new(kind, "roa", "beta");
        assert!(matches!(
            spec.validate(),
            Err(ChartError::MissingThirdIndicator(k)) if k == kind
        ));
    }

    #[test]
    fn test_build_drops_null_and_non_finite() {
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta");
        let chart = Chart::build(&table(), &spec).unwrap();

        let plotted: Vec<&str> = chart.points().iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(plotted, vec!["AMZN", "AAPL"]);
        assert_eq!(chart.skipped(), ["MSFT".to_string(), "CASH".to_string()]);
    }

    #[test]
    fn test_build_no_plottable_points() {
        let table = RatioTable::from_rows(&[row("MSFT", Some(0.1), None, None)]).unwrap();
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta");
        assert!(matches!(
            Chart::build(&table, &spec),
            Err(ChartError::NoPlottablePoints)
        ));
    }

    #[test]
    fn test_scatter_figure() {
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta");
        let figure = Chart::build(&table(), &spec).unwrap().to_plotly_json();

        let trace = &figure["data"][0];
        assert_eq!(trace["type"], "scatter");
        assert_eq!(trace["text"], json!(["AMZN", "AAPL"]));
        assert_eq!(trace["x"], json!([0.2, 0.25]));
        assert!(trace["marker"].get("color").is_none());
        assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "roa");
    }

    #[test]
    fn test_scatter_with_colour() {
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta").with_third("market_cap");
        let figure = Chart::build(&table(), &spec).unwrap().to_plotly_json();
        assert_eq!(figure["data"][0]["marker"]["color"], json!([2.0e12, -4.0e12]));
    }

    #[test]
    fn test_scatter3d_figure() {
        let spec = ChartSpec::new(ChartKind::Scatter3d, "roa", "beta").with_third("market_cap");
        let chart = Chart::build(&table(), &spec).unwrap();
        let figure = chart.to_plotly_json();

        assert_eq!(figure["data"][0]["type"], "scatter3d");
        assert_eq!(figure["data"][0]["z"], json!([2.0e12, -4.0e12]));
        assert_eq!(figure["layout"]["scene"]["zaxis"]["title"]["text"], "market_cap");
    }

    #[test]
    fn test_bubble_sizes_use_absolute_values() {
        let spec = ChartSpec::new(ChartKind::Bubble, "roa", "beta").with_third("market_cap");
        let figure = Chart::build(&table(), &spec).unwrap().to_plotly_json();
        let marker = &figure["data"][0]["marker"];

        assert_eq!(marker["size"], json!([2.0e12, 4.0e12]));
        assert_eq!(marker["sizemode"], "area");
        assert_relative_eq!(
            marker["sizeref"].as_f64().unwrap(),
            2.0 * 4.0e12 / 1600.0,
            epsilon = 1.0
        );
    }

    #[test]
    fn test_html_page() {
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta");
        let html = Chart::build(&table(), &spec).unwrap().to_html().unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("<title>roa vs beta</title>"));
        assert!(html.contains("\"AMZN\""));
    }

    #[test]
    fn test_html_embeds_same_figure_as_json() {
        let table = RatioTable::from_rows(&[
            row("AMZN", Some(0.2), Some(1.3), None),
            row("</script>", Some(0.1), Some(0.8), None),
        ])
        .unwrap();
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "beta");
        let chart = Chart::build(&table, &spec).unwrap();
        let html = chart.to_html().unwrap();

        assert_eq!(html.matches("</script>").count(), 2);
        let start = html.find("const figure = ").unwrap() + "const figure = ".len();
        let end = html[start..].find(";\nPlotly.newPlot").unwrap() + start;
        let embedded: Value = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(embedded, chart.to_plotly_json());
    }

    #[test]
    fn test_write_html() {
        let path = std::env::temp_dir().join(format!("fundus_chart_{}.html", std::process::id()));
        let spec = ChartSpec::new(ChartKind::Scatter, "roa", "ebit_price_ratio");
        Chart::build(&table(), &spec).unwrap().write_html(&path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("ebit_price_ratio"));
        std::fs::remove_file(path).ok();
    }
}
