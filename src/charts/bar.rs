use plotters::prelude::*;

use super::color::Scale;
use super::{segment_label, value_range, Area, Axes, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy)]
pub enum Fill {
    Solid(RGBColor),
    /// Colour each bar by its value.
    Scale(Scale),
}

/// One bar per label, in the given order.
pub fn draw(
    root: &Area<'_>,
    text: &ChartText,
    axes: Axes<'_>,
    data: &[(String, f64)],
    fill: Fill,
) -> Result<()> {
    let body = text.body(root)?;
    let labels: Vec<String> = data.iter().map(|(k, _)| k.clone()).collect();
    let n = data.len().max(1) as i32;
    let (y_lo, y_hi) = value_range(data.iter().map(|(_, v)| *v));
    let (v_lo, v_hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

    let mut builder = ChartBuilder::on(&body);
    builder.margin(12);
    if text.enabled {
        builder.x_label_area_size(50).y_label_area_size(80);
    }
    let mut chart = builder
        .build_cartesian_2d((0..n).into_segmented(), y_lo..y_hi)
        .map_err(AppError::render)?;

    if text.enabled {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len() + 1)
            .x_label_formatter(&|v| segment_label(v, &labels))
            .x_desc(axes.x)
            .y_desc(axes.y)
            .axis_desc_style((FONT_FAMILY, 15))
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(AppError::render)?;
    }

    chart
        .draw_series(data.iter().enumerate().map(|(i, (_, v))| {
            let color = match fill {
                Fill::Solid(c) => c,
                Fill::Scale(scale) => scale.for_value(*v, v_lo, v_hi),
            };
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
                color.filled(),
            );
            bar.set_margin(0, 0, 6, 6);
            bar
        }))
        .map_err(AppError::render)?;

    Ok(())
}
