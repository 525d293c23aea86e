//! Raster chart rendering: aggregated data in, PNG bytes out.

pub mod bar;
pub mod color;
pub mod geo;
pub mod heatmap;
pub mod map;
pub mod pie;
pub mod scatter;
pub mod stacked;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use tracing::debug;

use crate::dataset::{DateRange, Dataset};
use crate::error::{AppError, Result};
use crate::query::{self, ChartData};
use crate::types::ChartKind;

use self::color::Scale;

pub type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub const FONT_FAMILY: &str = "sans-serif";

/// Title and whether any text may be drawn at all.
///
/// Text needs a registered font; without one charts are shapes only.
#[derive(Debug, Clone)]
pub struct ChartText {
    pub title: String,
    pub enabled: bool,
}

impl ChartText {
    /// Area below the title, or the whole area when text is off.
    pub fn body<'a>(&self, area: &Area<'a>) -> Result<Area<'a>> {
        if self.enabled {
            area.titled(&self.title, (FONT_FAMILY, 22)).map_err(AppError::render)
        } else {
            Ok(area.clone())
        }
    }
}

/// Axis descriptions.
#[derive(Debug, Clone, Copy)]
pub struct Axes<'a> {
    pub x: &'a str,
    pub y: &'a str,
}

/// Register the TrueType font used for every chart label.
pub fn register_font(path: &str) -> Result<()> {
    let bytes = std::fs::read(path)?;
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| AppError::Config(format!("{path} is not a usable TrueType font")))
}

#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    pub width: u32,
    pub height: u32,
    pub labels: bool,
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32, labels: bool) -> Self {
        Self { width, height, labels }
    }

    /// Draw `data` the way `kind` is displayed and encode it as PNG.
    pub fn render(&self, kind: ChartKind, data: &ChartData, title: String) -> Result<Vec<u8>> {
        let text = ChartText { title, enabled: self.labels };
        let mut rgb = vec![0u8; (self.width * self.height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut rgb, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(AppError::render)?;
            draw(kind, data, &root, &text)?;
            root.present().map_err(AppError::render)?;
        }
        encode_png(&rgb, self.width, self.height)
    }
}

fn draw(kind: ChartKind, data: &ChartData, root: &Area<'_>, text: &ChartText) -> Result<()> {
    match (kind, data) {
        (ChartKind::TransactionsPerCountry, ChartData::Series(v)) => map::draw(root, text, v),
        (ChartKind::CountrySpending, ChartData::Series(v)) => bar::draw(
            root,
            text,
            Axes { x: "Country", y: "Total Spending (USD)" },
            v,
            bar::Fill::Scale(Scale::Viridis),
        ),
        (ChartKind::AvgTransaction, ChartData::Series(v)) => scatter::draw(
            root,
            text,
            Axes { x: "Country", y: "Average Transaction Amount (USD)" },
            v,
        ),
        (ChartKind::CurrencyDistribution, ChartData::Series(v)) => pie::draw(root, text, v),
        (ChartKind::TopCurrencies, ChartData::Series(v)) => bar::draw(
            root,
            text,
            Axes { x: "Currency", y: "Number of Transactions" },
            v,
            bar::Fill::Solid(color::category(0)),
        ),
        (ChartKind::CategoryPopularity, ChartData::Stacked(s)) => stacked::draw(
            root,
            text,
            Axes { x: "Country", y: "Total Amount (USD)" },
            s,
        ),
        (ChartKind::CategoryHeatmap, ChartData::Matrix(m)) => heatmap::draw(root, text, m),
        (kind, _) => Err(AppError::Render(format!("{kind} cannot draw this data shape"))),
    }
}

/// Filter → aggregate → render, for one chart request.
pub fn render_chart(
    kind: ChartKind,
    dataset: &Dataset,
    range: &DateRange,
    renderer: &ChartRenderer,
) -> Result<Vec<u8>> {
    let rows = dataset.filter(range);
    let data = query::compute(kind, &rows);
    debug!("{kind}: {} rows in range {}..={}", rows.len(), range.start, range.end);
    renderer.render(kind, &data, kind.title(range.start, range.end))
}

pub fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png)
        .write_image(rgb, width, height, image::ColorType::Rgb8)
        .map_err(AppError::render)?;
    Ok(png)
}

pub fn to_base64(png: &[u8]) -> String {
    STANDARD.encode(png)
}

/// Axis span covering every value and zero, padded 10% at the ends.
pub fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi - lo <= f64::EPSILON {
        return (0.0, 1.0);
    }
    (lo * 1.1, hi * 1.1)
}

/// Label for a segmented axis position.
pub fn segment_label(v: &SegmentValue<i32>, labels: &[String]) -> String {
    match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    }
}
