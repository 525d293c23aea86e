use plotters::prelude::*;
use tracing::debug;

use super::color::{normalize, Scale};
use super::{geo, Area, ChartText, FONT_FAMILY};
use crate::error::{AppError, Result};

const LON: (f64, f64) = (-180.0, 180.0);
const LAT: (f64, f64) = (-60.0, 85.0);
const OCEAN: RGBColor = RGBColor(229, 236, 246);
const MIN_RADIUS: f64 = 4.0;
const MAX_RADIUS: f64 = 20.0;

/// World map (equirectangular) with one marker per known country.
pub fn draw(root: &Area<'_>, text: &ChartText, data: &[(String, f64)]) -> Result<()> {
    let body = text.body(root)?;
    let mut chart = ChartBuilder::on(&body)
        .margin(12)
        .build_cartesian_2d(LON.0..LON.1, LAT.0..LAT.1)
        .map_err(AppError::render)?;

    chart
        .plotting_area()
        .fill(&OCEAN)
        .map_err(AppError::render)?;

    let grid = ShapeStyle::from(&WHITE).stroke_width(1);
    chart
        .draw_series((-150..=150).step_by(30).map(|lon| {
            PathElement::new(vec![(lon as f64, LAT.0), (lon as f64, LAT.1)], grid)
        }))
        .map_err(AppError::render)?;
    chart
        .draw_series((-60..=80).step_by(20).map(|lat| {
            PathElement::new(vec![(LON.0, lat as f64), (LON.1, lat as f64)], grid)
        }))
        .map_err(AppError::render)?;

    let placed: Vec<(&str, (f64, f64), f64)> = data
        .iter()
        .filter_map(|(name, v)| match geo::centroid(name) {
            Some(p) => Some((name.as_str(), p, *v)),
            None => {
                debug!("No map position for country '{name}'");
                None
            }
        })
        .collect();
    let (lo, hi) = placed
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, _, v)| (lo.min(*v), hi.max(*v)));

    chart
        .draw_series(placed.iter().map(|(_, pos, v)| {
            let t = normalize(*v, lo, hi);
            let radius = MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * t;
            Circle::new(*pos, radius.round() as i32, Scale::Plasma.at(t).mix(0.85).filled())
        }))
        .map_err(AppError::render)?;

    if text.enabled {
        chart
            .draw_series(placed.iter().map(|(name, (lon, lat), v)| {
                Text::new(format!("{name}: {v:.0}"), (*lon + 3.0, *lat - 3.0), (FONT_FAMILY, 11))
            }))
            .map_err(AppError::render)?;
    }

    Ok(())
}
