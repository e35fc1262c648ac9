use crate::chart::ChartArtifact;
use crate::domain::series::DATE_FORMAT;
use crate::domain::{ChartKind, FilteredSeries};
use plotters::prelude::*;
use std::fmt;
use thiserror::Error;

const DEFAULT_WIDTH: u32 = 1000;
const DEFAULT_HEIGHT: u32 = 600;
const MAX_X_LABELS: usize = 24;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot render an empty series")]
    EmptySeries,

    #[error("unsupported chart kind {0:?}")]
    UnsupportedKind(String),

    #[error("chart drawing failed: {0}")]
    Backend(String),
}

impl RenderError {
    pub fn user_message(&self) -> String {
        format!("Could not create chart: {self}")
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Defaults to "{label} Closing Prices".
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

pub fn render(
    series: &FilteredSeries,
    label: &str,
    kind: ChartKind,
) -> Result<ChartArtifact, RenderError> {
    render_with(series, label, kind, &RenderOptions::default())
}

/// Like [`render`], for a chart kind that has not been parsed yet.
pub fn render_named(
    series: &FilteredSeries,
    label: &str,
    kind: &str,
) -> Result<ChartArtifact, RenderError> {
    let kind = kind
        .parse::<ChartKind>()
        .map_err(|_| RenderError::UnsupportedKind(kind.to_string()))?;
    render(series, label, kind)
}

pub fn render_with(
    series: &FilteredSeries,
    label: &str,
    kind: ChartKind,
    opts: &RenderOptions,
) -> Result<ChartArtifact, RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptySeries);
    }

    // Categories come from the chronologically sorted keys, never from input order.
    let mut points: Vec<_> = series.points().collect();
    points.sort_by_key(|p| p.date);
    let x_labels: Vec<String> = points
        .iter()
        .map(|p| p.date.format(DATE_FORMAT).to_string())
        .collect();
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();

    let title = opts
        .title
        .clone()
        .unwrap_or_else(|| format!("{label} Closing Prices"));

    let mut svg = String::new();
    draw(&mut svg, &title, label, kind, &x_labels, &closes, (opts.width, opts.height))?;

    tracing::debug!(%label, %kind, points = closes.len(), bytes = svg.len(), "rendered chart");
    Ok(ChartArtifact { kind, svg, x_labels })
}

fn draw(
    out: &mut String,
    title: &str,
    label: &str,
    kind: ChartKind,
    x_labels: &[String],
    closes: &[f64],
    size: (u32, u32),
) -> Result<(), RenderError> {
    let n = closes.len();
    let (y_min, y_max) = y_bounds(closes);

    let root = SVGBackend::with_string(out, size).into_drawing_area();
    root.fill(&WHITE).map_err(backend_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), y_min..y_max)
        .map_err(backend_err)?;

    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            x_labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n.min(MAX_X_LABELS))
        .x_label_formatter(&label_for)
        .x_desc("Date")
        .y_desc("Close")
        .draw()
        .map_err(backend_err)?;

    match kind {
        ChartKind::Line => {
            chart
                .draw_series(LineSeries::new(
                    closes
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (SegmentValue::CenterOf(i), *c)),
                    &BLUE,
                ))
                .map_err(backend_err)?
                .label(label)
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        }
        ChartKind::Bar => {
            let fill = BLUE.mix(0.6).filled();
            chart
                .draw_series(closes.iter().enumerate().map(|(i, c)| {
                    Rectangle::new(
                        [(SegmentValue::Exact(i), y_min), (SegmentValue::Exact(i + 1), *c)],
                        fill,
                    )
                }))
                .map_err(backend_err)?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill));
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(backend_err)?;

    root.present().map_err(backend_err)?;
    Ok(())
}

/// Price bounds padded by 10% of the span. The lower bound is clamped to zero,
/// never below it. A flat series spans 1% of its value so the axis has height.
fn y_bounds(closes: &[f64]) -> (f64, f64) {
    let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(max.abs() * 0.01).max(1e-6);
    let padding = span * 0.1;
    ((min - padding).max(0.0), max + padding)
}

fn backend_err<E: fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;
    use chrono::NaiveDate;

    fn series(points: &[(&str, f64)]) -> FilteredSeries {
        points
            .iter()
            .map(|(d, c)| PricePoint {
                date: NaiveDate::parse_from_str(d, DATE_FORMAT).unwrap(),
                close: *c,
            })
            .collect()
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = render(&FilteredSeries::new(), "AAPL", ChartKind::Line).unwrap_err();
        assert!(matches!(err, RenderError::EmptySeries));
    }

    #[test]
    fn x_labels_are_ascending_regardless_of_input_order() {
        let s = series(&[
            ("2024-01-10", 160.0),
            ("2024-01-02", 148.5),
            ("2024-01-03", 150.0),
        ]);
        let chart = render(&s, "AAPL", ChartKind::Line).unwrap();
        assert_eq!(chart.x_labels(), &["2024-01-02", "2024-01-03", "2024-01-10"]);
    }

    #[test]
    fn line_chart_is_svg_with_title() {
        let s = series(&[("2024-01-02", 148.5), ("2024-01-03", 150.0)]);
        let chart = render(&s, "AAPL", ChartKind::Line).unwrap();
        assert_eq!(chart.kind(), ChartKind::Line);
        assert!(chart.svg().contains("<svg"));
        assert!(chart.svg().contains("AAPL Closing Prices"));
        assert!(chart.svg().contains("<polyline"));
    }

    #[test]
    fn bar_chart_draws_one_rect_per_point() {
        let s = series(&[
            ("2024-01-02", 148.5),
            ("2024-01-03", 150.0),
            ("2024-01-04", 151.0),
        ]);
        let chart = render(&s, "AAPL", ChartKind::Bar).unwrap();
        // Background and legend add rects of their own.
        assert!(chart.svg().matches("<rect").count() >= 3);
    }

    #[test]
    fn custom_title_is_used() {
        let s = series(&[("2024-01-02", 1.0)]);
        let opts = RenderOptions {
            title: Some("IBM Stock Prices".to_string()),
            ..Default::default()
        };
        let chart = render_with(&s, "IBM", ChartKind::Bar, &opts).unwrap();
        assert!(chart.svg().contains("IBM Stock Prices"));
    }

    #[test]
    fn unknown_kind_name_is_render_error() {
        let s = series(&[("2024-01-02", 1.0)]);
        let err = render_named(&s, "IBM", "pie").unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedKind(k) if k == "pie"));
        assert!(render_named(&s, "IBM", "b").is_ok());
    }

    #[test]
    fn y_bounds_pad_and_floor_at_zero() {
        let (lo, hi) = y_bounds(&[100.0, 200.0]);
        assert!((lo - 90.0).abs() < 1e-9);
        assert!((hi - 210.0).abs() < 1e-9);

        // Padding would dip below zero here.
        let (lo, hi) = y_bounds(&[0.0, 100.0]);
        assert_eq!(lo, 0.0);
        assert!((hi - 110.0).abs() < 1e-9);

        let (lo, hi) = y_bounds(&[0.5]);
        assert!((lo - 0.4995).abs() < 1e-9);
        assert!((hi - 0.5005).abs() < 1e-9);
    }
}
