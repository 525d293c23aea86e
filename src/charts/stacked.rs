use plotters::prelude::*;

use super::{color, segment_label, value_range, Area, Axes, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};
use crate::query::StackedBars;

/// Per-group stacks; segments are laid down in their stored order.
pub fn draw(root: &Area<'_>, text: &ChartText, axes: Axes<'_>, bars: &StackedBars) -> Result<()> {
    let body = text.body(root)?;
    let n = bars.groups.len().max(1) as i32;
    let (y_lo, y_hi) = value_range(bars.totals().into_iter());

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
            .x_labels(bars.groups.len() + 1)
            .x_label_formatter(&|v| segment_label(v, &bars.groups))
            .x_desc(axes.x)
            .y_desc(axes.y)
            .axis_desc_style((FONT_FAMILY, 15))
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(AppError::render)?;
    }

    // Running base of each group's stack.
    let mut base = vec![0.0; bars.groups.len()];
    let mut spans = Vec::with_capacity(bars.segments.len());
    for s in &bars.segments {
        let lo = base[s.group];
        base[s.group] += s.value;
        spans.push((s.group as i32, s.category, lo, base[s.group]));
    }

    for (c, name) in bars.categories.iter().enumerate() {
        let fill = color::category(c);
        let series = chart
            .draw_series(spans.iter().filter(|s| s.1 == c).map(|&(g, _, lo, hi)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(g), lo), (SegmentValue::Exact(g + 1), hi)],
                    fill.filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(AppError::render)?;
        if text.enabled {
            series
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.filled()));
        }
    }

    if text.enabled && !bars.categories.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((FONT_FAMILY, 12))
            .draw()
            .map_err(AppError::render)?;
    }

    Ok(())
}
