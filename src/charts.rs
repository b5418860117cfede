//! Plotly figure specs for the dashboard's five plots.
//!
//! Figures are plain serde structs that serialize to the JSON shape
//! `Plotly.newPlot` expects; the browser does the drawing.

use serde::Serialize;
use serde_json::Value;

use crate::analysis::{self, HistogramBin, Timeline, TrackRecord, YearBox, HISTOGRAM_BINS};
use crate::html::escape_html;

/// Dark grey used for points and bars.
pub const CHARCOAL: &str = "#36454F";

/// Green used for highlights.
pub const GREEN: &str = "#008000";

/// A complete figure: traces plus layout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    /// Traces drawn in order.
    pub data: Vec<Trace>,
    /// Axes and spacing.
    pub layout: Layout,
}

/// A single Plotly trace.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Bar(BarTrace),
    Box(BoxTrace),
}

/// Points or a line.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScatterTrace {
    /// Days since the first release.
    pub x: Vec<i64>,
    /// Popularity scores.
    pub y: Vec<u32>,
    /// "markers" or "lines".
    pub mode: String,
    /// Legend entry.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    /// Per-point hover text, already HTML-escaped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
}

/// Vertical or horizontal bars.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BarTrace {
    /// Categories, or values for horizontal bars.
    pub x: Vec<Value>,
    /// Values, or categories for horizontal bars.
    pub y: Vec<Value>,
    /// Legend entry.
    pub name: String,
    /// `Some("h")` for horizontal bars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// Explicit bar widths in axis units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Vec<f64>>,
    pub marker: Marker,
    pub opacity: f64,
}

/// Box trace with precomputed statistics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BoxTrace {
    /// One category per box.
    pub x: Vec<String>,
    pub q1: Vec<f64>,
    pub median: Vec<f64>,
    pub q3: Vec<f64>,
    /// Whisker ends: the year's minimum and maximum.
    pub lowerfence: Vec<f64>,
    pub upperfence: Vec<f64>,
    /// Legend entry.
    pub name: String,
    pub marker: Marker,
}

/// Fill colour and optional outline.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Marker {
    /// CSS colour.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<MarkerLine>,
}

impl Marker {
    fn solid(color: &str) -> Self {
        Self {
            color: color.to_string(),
            line: None,
        }
    }
}

/// Outline drawn around bars.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkerLine {
    /// CSS colour.
    pub color: String,
    /// Pixels.
    pub width: f64,
}

/// Style of a line trace.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Line {
    /// CSS colour.
    pub color: String,
    /// Pixels.
    pub width: f64,
    /// "solid", "dot", "dash", ...
    pub dash: String,
}

/// Figure-wide settings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub showlegend: bool,
    /// Gap between bars as a fraction of the bar slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
}

impl Layout {
    fn titled(x: &str, y: &str) -> Self {
        Self {
            xaxis: Axis::titled(x),
            yaxis: Axis::titled(y),
            showlegend: false,
            bargap: None,
        }
    }
}

/// One axis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    /// Label shown next to the axis.
    pub title: AxisTitle,
    /// Force categorical axes for years so Plotly does not interpolate.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
}

impl Axis {
    fn titled(text: &str) -> Self {
        Self {
            title: AxisTitle {
                text: text.to_string(),
            },
            axis_type: None,
        }
    }

    fn categorical(mut self) -> Self {
        self.axis_type = Some("category".to_string());
        self
    }
}

/// Axis label.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AxisTitle {
    pub text: String,
}

/// Release timeline: one point per track, dotted line over each release's
/// best track.
pub fn release_timeline(timeline: &Timeline) -> Figure {
    let points = ScatterTrace {
        x: timeline.points.iter().map(|p| p.days_since_first_release).collect(),
        y: timeline.points.iter().map(|p| p.track_pop).collect(),
        mode: "markers".to_string(),
        name: "tracks".to_string(),
        marker: Some(Marker::solid(CHARCOAL)),
        line: None,
        text: Some(
            timeline
                .points
                .iter()
                .map(|p| {
                    format!(
                        "{}<br>{}<br>{}<br>{}",
                        escape_html(&p.track_title),
                        escape_html(&p.album_title),
                        p.release_date,
                        escape_html(&p.label)
                    )
                })
                .collect(),
        ),
        hovertemplate: Some(
            "%{text}<br>day %{x}<br>popularity %{y}<extra></extra>".to_string(),
        ),
    };

    let best = ScatterTrace {
        x: timeline.max_line.iter().map(|(day, _)| *day).collect(),
        y: timeline.max_line.iter().map(|(_, pop)| *pop).collect(),
        mode: "lines".to_string(),
        name: "most popular track".to_string(),
        marker: None,
        line: Some(Line {
            color: "green".to_string(),
            width: 3.0,
            dash: "dot".to_string(),
        }),
        text: None,
        hovertemplate: None,
    };

    Figure {
        data: vec![Trace::Scatter(points), Trace::Scatter(best)],
        layout: Layout::titled("Days into the artist's career", "Spotify track popularity"),
    }
}

/// Distribution of track popularity scores.
pub fn popularity_histogram(bins: &[HistogramBin]) -> Figure {
    let bars = BarTrace {
        x: bins
            .iter()
            .map(|b| Value::from((b.start + b.end) / 2.0))
            .collect(),
        y: bins.iter().map(|b| Value::from(b.count)).collect(),
        name: "tracks".to_string(),
        orientation: None,
        width: Some(bins.iter().map(|b| b.end - b.start).collect()),
        marker: Marker {
            color: GREEN.to_string(),
            line: Some(MarkerLine {
                color: "black".to_string(),
                width: 1.0,
            }),
        },
        opacity: 0.5,
    };

    let mut layout = Layout::titled("Spotify track popularity", "Track count");
    layout.bargap = Some(0.0);

    Figure {
        data: vec![Trace::Bar(bars)],
        layout,
    }
}

/// Tracks released per year.
pub fn releases_per_year(years: &[(i32, usize)]) -> Figure {
    let bars = BarTrace {
        x: years.iter().map(|(year, _)| Value::from(year.to_string())).collect(),
        y: years.iter().map(|(_, count)| Value::from(*count)).collect(),
        name: "tracks_released".to_string(),
        orientation: None,
        width: None,
        marker: Marker::solid(CHARCOAL),
        opacity: 0.8,
    };

    let mut layout = Layout::titled("Release year", "Tracks released");
    layout.xaxis = layout.xaxis.categorical();

    Figure {
        data: vec![Trace::Bar(bars)],
        layout,
    }
}

/// Track popularity grouped by release year.
pub fn popularity_by_year(boxes: &[YearBox]) -> Figure {
    let trace = BoxTrace {
        x: boxes.iter().map(|b| b.year.to_string()).collect(),
        q1: boxes.iter().map(|b| b.q1).collect(),
        median: boxes.iter().map(|b| b.median).collect(),
        q3: boxes.iter().map(|b| b.q3).collect(),
        lowerfence: boxes.iter().map(|b| b.min).collect(),
        upperfence: boxes.iter().map(|b| b.max).collect(),
        name: "track_pop".to_string(),
        marker: Marker::solid(GREEN),
    };

    let mut layout = Layout::titled("Release year", "Spotify track popularity");
    layout.xaxis = layout.xaxis.categorical();

    Figure {
        data: vec![Trace::Box(trace)],
        layout,
    }
}

/// Horizontal bars of tracks per record label, fewest first.
pub fn label_partners(labels: &[(String, usize)]) -> Figure {
    let bars = BarTrace {
        x: labels.iter().map(|(_, count)| Value::from(*count)).collect(),
        y: labels
            .iter()
            .map(|(label, _)| Value::from(escape_html(label)))
            .collect(),
        name: "total_releases".to_string(),
        orientation: Some("h".to_string()),
        width: None,
        marker: Marker::solid(CHARCOAL),
        opacity: 0.8,
    };

    let mut layout = Layout::titled("total releases", "label");
    layout.yaxis = layout.yaxis.categorical();

    Figure {
        data: vec![Trace::Bar(bars)],
        layout,
    }
}

/// The five dashboard plots.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardFigures {
    /// Release timeline.
    pub scatter_plot: Figure,
    /// Distribution of track popularity.
    pub histogram: Figure,
    /// Tracks released per year.
    pub bar_chart: Figure,
    /// Track popularity per year.
    pub box_whisker: Figure,
    /// Tracks per record label.
    pub label_chart: Figure,
}

impl DashboardFigures {
    /// Build every plot from the discography table.
    pub fn from_records(records: &[TrackRecord]) -> Self {
        let scores: Vec<u32> = records.iter().map(|r| r.track_pop).collect();

        Self {
            scatter_plot: release_timeline(&analysis::timeline(records)),
            histogram: popularity_histogram(&analysis::histogram(&scores, HISTOGRAM_BINS)),
            bar_chart: releases_per_year(&analysis::releases_per_year(records)),
            box_whisker: popularity_by_year(&analysis::popularity_by_year(records)),
            label_chart: label_partners(&analysis::label_counts(records)),
        }
    }

    /// `(element id, figure)` pairs in page order.
    pub fn named(&self) -> [(&'static str, &Figure); 5] {
        [
            ("histogram", &self.histogram),
            ("label-chart", &self.label_chart),
            ("bar-chart", &self.bar_chart),
            ("box-whisker", &self.box_whisker),
            ("scatter-plot", &self.scatter_plot),
        ]
    }
}
