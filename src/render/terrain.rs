//! Convolution-based transforms over a padded, normalized DEM.
//!
//! The input is the assembler's `(256 + 2) x (256 + 2)` raster; convolving
//! its interior yields exactly one value per tile pixel.

use std::f64::consts::PI;

use image::RgbaImage;

use super::{clip, paint, Palette, RenderParams};
use crate::dem::Raster;
use crate::error::RenderError;

/// North minus south gradient, NW..SE order.
pub const NS_KERNEL: [f64; 9] = [0.25, 0.5, 0.25, 0.0, 0.0, 0.0, -0.25, -0.5, -0.25];

/// East minus west gradient, NW..SE order.
pub const EW_KERNEL: [f64; 9] = [-0.25, 0.0, 0.25, -0.5, 0.0, 0.5, -0.25, 0.0, 0.25];

/// Center minus the mean of the four edge neighbors.
pub const LAPLACIAN_KERNEL: [f64; 9] = [0.0, -0.25, 0.0, -0.25, 1.0, -0.25, 0.0, -0.25, 0.0];

pub const DEFAULT_SLOPE_RAMP: &str = "ffffff-000000";
pub const DEFAULT_CURVATURE_RAMP: &str = "000000-ffffff";
pub const DEFAULT_HILLSHADE_RAMP: &str = "00000000-000000ff";

fn palette(params: &RenderParams, ramp: &str, low: f64, high: f64) -> Palette {
    let (low, high) = params.range_or(low, high);
    Palette {
        ramp: params.ramp_or(ramp),
        fallback: params.fallback_color(),
        low,
        high,
    }
}

fn degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Angle in degrees between the normal of a surface with gradients `ns` and
/// `ew` and the unit vector `light`.
fn incidence(ns: f64, ew: f64, light: [f64; 3]) -> f64 {
    let [lx, ly, lz] = light;
    let cos_theta = (-ew * lx - ns * ly + lz) / (1.0 + ew * ew + ns * ns).sqrt();
    // rounding can push a parallel normal just past 1
    degrees(cos_theta.clamp(-1.0, 1.0).acos())
}

/// Slope angle in degrees, shaded over `[low, high]` (default `[0, 90]`).
pub fn slope(dem: &Raster<f64>, params: &RenderParams) -> Result<RgbaImage, RenderError> {
    let palette = palette(params, DEFAULT_SLOPE_RAMP, 0.0, 90.0);
    let gain = params.gain_or(1.0);

    let ns = dem.apply_kernel(&NS_KERNEL)?;
    let ew = dem.apply_kernel(&EW_KERNEL)?;

    Ok(paint(&ns, |i| {
        let slope = (ns.samples()[i] * gain).hypot(ew.samples()[i] * gain);
        let degree = clip(degrees(slope.atan()), palette.low, palette.high);
        palette.color(degree)
    }))
}

/// Curvature angle in degrees, shaded over `[low, high]` (default `[-90, 90]`).
///
/// Positive where the center sits above its neighbors.
pub fn curvature(dem: &Raster<f64>, params: &RenderParams) -> Result<RgbaImage, RenderError> {
    let palette = palette(params, DEFAULT_CURVATURE_RAMP, -90.0, 90.0);
    let gain = params.gain_or(1.0);

    let laplacian = dem.apply_kernel(&LAPLACIAN_KERNEL)?;

    Ok(paint(&laplacian, |i| {
        let curvature = laplacian.samples()[i] * gain;
        let degree = clip(degrees(curvature.atan()), palette.low, palette.high);
        palette.color(degree)
    }))
}

/// Angle between the surface normal and a light source, in degrees.
///
/// The light comes from azimuth `dir` (clockwise from north, default 0) at
/// elevation `alt` (default 45). A surface facing the light is 0 degrees, so
/// the default ramp leaves lit faces transparent and darkens the rest.
pub fn hillshade(dem: &Raster<f64>, params: &RenderParams) -> Result<RgbaImage, RenderError> {
    let palette = palette(params, DEFAULT_HILLSHADE_RAMP, 0.0, 90.0);
    let gain = params.gain_or(1.0);
    let dir = params.dir.unwrap_or(0.0).to_radians();
    let alt = params.alt.unwrap_or(45.0).to_radians();

    let light = [alt.cos() * dir.sin(), alt.cos() * dir.cos(), alt.sin()];

    let dzdy = dem.apply_kernel(&NS_KERNEL)?;
    let dzdx = dem.apply_kernel(&EW_KERNEL)?;

    Ok(paint(&dzdy, |i| {
        let ns = dzdy.samples()[i] * gain;
        let ew = dzdx.samples()[i] * gain;
        if ns.is_nan() || ew.is_nan() {
            return palette.fallback;
        }

        let degree = clip(incidence(ns, ew, light), palette.low, palette.high);
        palette.color(degree)
    }))
}
