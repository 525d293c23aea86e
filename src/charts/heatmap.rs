use plotters::prelude::*;

use super::color::Scale;
use super::{segment_label, Area, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};
use crate::query::CountMatrix;

/// Country rows top to bottom, category columns left to right with their
/// labels along the top edge.
pub fn draw(root: &Area<'_>, text: &ChartText, matrix: &CountMatrix) -> Result<()> {
    let body = text.body(root)?;
    let rows = matrix.rows.len().max(1) as i32;
    let cols = matrix.cols.len().max(1) as i32;
    let max = matrix.max();
    // The y axis grows upward, so row labels are looked up in reverse.
    let row_labels: Vec<String> = matrix.rows.iter().rev().cloned().collect();

    let mut builder = ChartBuilder::on(&body);
    builder.margin(12);
    if text.enabled {
        builder
            .set_label_area_size(LabelAreaPosition::Top, 60)
            .y_label_area_size(110);
    }
    let mut chart = builder
        .build_cartesian_2d((0..cols).into_segmented(), (0..rows).into_segmented())
        .map_err(AppError::render)?;

    if text.enabled {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(matrix.cols.len() + 1)
            .y_labels(matrix.rows.len() + 1)
            .x_label_formatter(&|v| segment_label(v, &matrix.cols))
            .y_label_formatter(&|v| segment_label(v, &row_labels))
            .x_desc("Merchant Category")
            .y_desc("Country")
            .axis_desc_style((FONT_FAMILY, 15))
            .label_style((FONT_FAMILY, 12))
            .draw()
            .map_err(AppError::render)?;
    }

    let n_rows = matrix.rows.len() as i32;
    chart
        .draw_series(matrix.cells.iter().enumerate().flat_map(|(i, row)| {
            let y = n_rows - 1 - i as i32;
            row.iter().enumerate().map(move |(j, count)| {
                let j = j as i32;
                Rectangle::new(
                    [
                        (SegmentValue::Exact(j), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(j + 1), SegmentValue::Exact(y + 1)),
                    ],
                    Scale::Viridis.for_value(*count, 0.0, max).filled(),
                )
            })
        }))
        .map_err(AppError::render)?;

    Ok(())
}
