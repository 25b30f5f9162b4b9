//! Per-pixel transforms over a single tile.

use image::{Rgba, RgbaImage};

use super::{Palette, RenderParams};
use crate::dem::{decode_pixel, encode_mapbox};

pub const DEFAULT_ELEVATION_RAMP: &str = "000000-ffffff";
pub const DEFAULT_ELEVATION_RANGE: (f64, f64) = (0.0, 4000.0);

/// Re-encode every pixel as Terrain-RGB, keeping the source alpha.
///
/// No-data is not special-cased: it is re-encoded as a raw value of zero,
/// which Terrain-RGB readers see as sea level.
pub fn mapbox(source: &RgbaImage) -> RgbaImage {
    let mut output = source.clone();
    for pixel in output.pixels_mut() {
        let raw = decode_pixel(pixel).unwrap_or(0);
        let [r, g, b] = encode_mapbox(raw);
        *pixel = Rgba([r, g, b, pixel[3]]);
    }
    output
}

/// Color every pixel by altitude in meters.
///
/// Altitude is `raw * 0.01 * gain`, mapped through `colors` over
/// `[low, high]`.
pub fn elevation(source: &RgbaImage, params: &RenderParams) -> RgbaImage {
    let (low, high) = params.range_or(DEFAULT_ELEVATION_RANGE.0, DEFAULT_ELEVATION_RANGE.1);
    let gain = params.gain_or(1.0);
    let palette = Palette {
        ramp: params.ramp_or(DEFAULT_ELEVATION_RAMP),
        fallback: params.fallback_color(),
        low,
        high,
    };

    let mut output = RgbaImage::new(source.width(), source.height());
    for (dst, src) in output.pixels_mut().zip(source.pixels()) {
        *dst = match decode_pixel(src) {
            Some(raw) => palette.color(raw as f64 * 0.01 * gain),
            None => palette.fallback,
        };
    }
    output
}
