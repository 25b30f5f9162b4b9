use image::{Rgba, RgbaImage};

use super::{paint, RenderParams};
use crate::dem::Raster;
use crate::error::RenderError;

/// Contour spacing in meters.
pub const DEFAULT_INTERVAL: f64 = 100.0;

pub const DEFAULT_CONTOUR_COLOR: &str = "ffffff";

/// Draw contour lines over a padded, raw (centimeter) DEM.
///
/// A cell is on a line when its elevation band, `floor(meters / interval)`,
/// differs from that of its east or south neighbor. Lines are drawn in
/// `color`; everything else, including no-data centers, is `fallback`.
pub fn contour(dem: &Raster<f64>, params: &RenderParams) -> Result<RgbaImage, RenderError> {
    let interval = params.interval.unwrap_or(DEFAULT_INTERVAL);
    let color = params.color_or(DEFAULT_CONTOUR_COLOR);
    let fallback = params.fallback_color();

    let band = |raw: f64| (raw * 0.01 / interval).floor();

    let lines = dem.apply_function(|&[_, _, _, _, c, e, _, s, _]| {
        let center = band(c);
        !center.is_nan() && (center != band(e) || center != band(s))
    })?;

    Ok(paint(&lines, |i| {
        if lines.samples()[i] {
            color
        } else {
            fallback
        }
    }))
}
