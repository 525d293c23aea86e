use std::f64::consts::{FRAC_PI_2, TAU};

use plotters::prelude::*;

use super::{color, Area, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};

const ARC_STEP: f64 = TAU / 180.0;

/// Share of each label in the total, as slices clockwise from 12 o'clock.
pub fn draw(root: &Area<'_>, text: &ChartText, data: &[(String, f64)]) -> Result<()> {
    let body = text.body(root)?;
    let (w, _) = body.dim_in_pixel();
    let (plot, legend) = if text.enabled {
        let (p, l) = body.split_horizontally((w as f64 * 0.7) as u32);
        (p, Some(l))
    } else {
        (body, None)
    };

    let (pw, ph) = plot.dim_in_pixel();
    let center = (pw as i32 / 2, ph as i32 / 2);
    let radius = (pw.min(ph) as f64 / 2.0 - 10.0).max(1.0);

    let total: f64 = data.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        plot.draw(&Circle::new(center, radius as i32, ShapeStyle::from(&BLACK.mix(0.2))))
            .map_err(AppError::render)?;
        return Ok(());
    }

    let mut start = -FRAC_PI_2;
    for (i, (_, v)) in data.iter().enumerate() {
        let sweep = v.max(0.0) / total * TAU;
        if sweep <= 0.0 {
            continue;
        }
        plot.draw(&Polygon::new(slice(center, radius, start, sweep), color::category(i).filled()))
            .map_err(AppError::render)?;
        start += sweep;
    }

    if let Some(legend) = legend {
        for (i, (name, v)) in data.iter().enumerate() {
            let y = 20 + i as i32 * 20;
            legend
                .draw(&Rectangle::new([(10, y - 6), (22, y + 6)], color::category(i).filled()))
                .map_err(AppError::render)?;
            let share = v.max(0.0) / total * 100.0;
            legend
                .draw(&Text::new(
                    format!("{name} ({share:.1}%)"),
                    (30, y - 7),
                    (FONT_FAMILY, 14),
                ))
                .map_err(AppError::render)?;
        }
    }

    Ok(())
}

/// Outline of one slice in pixel coordinates.
fn slice(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / ARC_STEP).ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for k in 0..=steps {
        let a = start + sweep * k as f64 / steps as f64;
        points.push((
            center.0 + (radius * a.cos()).round() as i32,
            center.1 + (radius * a.sin()).round() as i32,
        ));
    }
    points
}
