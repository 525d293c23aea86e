use plotters::prelude::*;

use super::color::{normalize, Scale};
use super::{segment_label, value_range, Area, Axes, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};

const MIN_RADIUS: f64 = 4.0;
const MAX_RADIUS: f64 = 18.0;

/// One marker per label; size and colour both follow the value.
pub fn draw(root: &Area<'_>, text: &ChartText, axes: Axes<'_>, data: &[(String, f64)]) -> Result<()> {
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
            let t = normalize(*v, v_lo, v_hi);
            let radius = MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t;
            Circle::new(
                (SegmentValue::CenterOf(i as i32), *v),
                radius.round() as i32,
                Scale::Plasma.at(t).filled(),
            )
        }))
        .map_err(AppError::render)?;

    Ok(())
}
