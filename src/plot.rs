//! Charts of the raw data next to the fitted regression curves.
//!
//! A [`ChartSpec`] is built from a [`Report`] and rendered with the `plotters` SVG backend.
//! PNG output rasterises that SVG with `resvg`.
//!
//! ```rust
//! use polytrend::{plot::{render_svg, ChartSpec, PlotOptions}, registry::Registry, report::fit_table, table::Table};
//!
//! let table = Table::build(Registry::builtin(), "Population", &["Mexico"]).unwrap();
//! let report = fit_table(&table, 3, 5.0).unwrap();
//! let spec = ChartSpec::from_report("Population", &report);
//! let svg = render_svg(&spec, &PlotOptions::default()).unwrap();
//! assert!(svg.contains("Mexico Data"));
//! ```
use std::{ops::Range, path::Path};

use plotters::prelude::*;
use resvg::usvg;

use crate::{config::Config, display::format_sci, report::Report};

mod palette;
pub use palette::Palette;

/// Chart title
pub const TITLE: &str = "Latin America Data Regression and Function Analysis";

/// Error occurring during plotting
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Error drawing the plot
    #[error("Error drawing plot: {0}")]
    Draw(#[from] DrawingAreaErrorKind<std::io::Error>),

    /// Error parsing SVG
    #[error("Rendering error: {0}")]
    SvgParse(#[from] usvg::Error),

    /// Error encoding PNG
    #[error("PNG encoding error: {0}")]
    PngEncode(String),

    /// Error writing the chart file
    #[error("Could not write chart: {0}")]
    Io(#[from] std::io::Error),

    /// The output path has no extension the chart can be written as
    #[error("Unsupported chart format `{0}`; use .svg or .png")]
    UnsupportedFormat(String),
}

/// The scatter and regression line of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTrace {
    /// Legend label of the scatter, `"<entity> Data"`
    pub data_label: String,

    /// The usable `(year, value)` points
    pub data: Vec<(f64, f64)>,

    /// Legend label of the line, `"<entity> Regression (deg <d>)"`
    pub line_label: String,

    /// The predictions over the shared domain
    pub line: Vec<(f64, f64)>,
}

/// Everything needed to draw a chart, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// Chart caption
    pub title: String,
    /// Horizontal axis description
    pub x_label: String,
    /// Vertical axis description
    pub y_label: String,
    /// One trace per successfully fitted entity, in column order
    pub traces: Vec<EntityTrace>,
}
impl ChartSpec {
    /// Builds a chart of every successfully fitted entity in `report`.
    ///
    /// Entities that failed are left out.
    #[must_use]
    pub fn from_report(category: &str, report: &Report) -> Self {
        let traces = report
            .successes()
            .map(|r| EntityTrace {
                data_label: format!("{} Data", r.entity),
                data: r.points.iter().map(|&(x, y)| (f64::from(x), y)).collect(),
                line_label: format!("{} Regression (deg {})", r.entity, r.degree),
                line: r.predictions.clone(),
            })
            .collect();

        Self {
            title: TITLE.to_string(),
            x_label: "Year".to_string(),
            y_label: category.to_string(),
            traces,
        }
    }

    /// The x and y ranges covering every finite point, padded by 5%.
    #[must_use]
    pub fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let points = self
            .traces
            .iter()
            .flat_map(|t| t.data.iter().chain(t.line.iter()))
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in points {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }

        (padded(x), padded(y))
    }
}

fn padded((min, max): (f64, f64)) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad)..(max + pad)
}

/// Size of the rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotOptions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}
impl Default for PlotOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}
impl From<&Config> for PlotOptions {
    fn from(config: &Config) -> Self {
        Self {
            width: config.plot_width,
            height: config.plot_height,
        }
    }
}

fn axis_label(v: f64) -> String {
    if v == 0.0 || (1e-3..1e5).contains(&v.abs()) {
        format!("{v:.0}")
    } else {
        format_sci(v, 1)
    }
}

/// Draws the chart as an SVG document.
///
/// # Errors
/// Returns an error if the chart cannot be drawn.
pub fn render_svg(spec: &ChartSpec, options: &PlotOptions) -> Result<String, PlotError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = spec.bounds();
        let mut chart = ChartBuilder::on(&root)
            .caption(&spec.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| axis_label(*v))
            .draw()?;

        let mut palette = Palette::default();
        for trace in &spec.traces {
            let color = palette.next_color();

            chart
                .draw_series(
                    trace
                        .data
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
                )?
                .label(trace.data_label.as_str())
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));

            let style = color.stroke_width(2);
            chart
                .draw_series(LineSeries::new(trace.line.iter().copied(), style))?
                .label(trace.line_label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        if !spec.traces.is_empty() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()?;
        }

        root.present()?;
    }

    Ok(svg)
}

/// Rasterises an SVG document into a PNG file.
///
/// # Errors
/// Returns an error if the SVG cannot be parsed or the PNG cannot be written.
pub fn svg_to_png(svg: &str, target: &Path) -> Result<(), PlotError> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let rtree = usvg::Tree::from_str(svg, &opt)?;
    let pixmap_size = rtree.size().to_int_size();

    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixmap_size.width(), pixmap_size.height())
        .ok_or_else(|| PlotError::PngEncode("Empty image".to_string()))?;
    resvg::render(&rtree, usvg::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .save_png(target)
        .map_err(|e| PlotError::PngEncode(e.to_string()))?;
    Ok(())
}

/// Renders the chart and writes it to `target`, as SVG or PNG depending on the extension.
///
/// # Errors
/// Returns an error if the extension is not `svg` or `png`, or if rendering or writing fails.
pub fn write_chart(spec: &ChartSpec, options: &PlotOptions, target: &Path) -> Result<(), PlotError> {
    let extension = target
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let svg = match extension.as_str() {
        "svg" | "png" => render_svg(spec, options)?,
        _ => return Err(PlotError::UnsupportedFormat(target.display().to_string())),
    };

    if extension == "png" {
        svg_to_png(&svg, target)?;
    } else {
        std::fs::write(target, svg)?;
    }

    log::info!("Wrote chart to {}", target.display());
    Ok(())
}
