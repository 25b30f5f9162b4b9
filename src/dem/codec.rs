//! Elevation codec for RGB-packed DEM tiles.
//!
//! Each pixel carries a 24-bit value `raw = (r << 16) | (g << 8) | b`
//! interpreted as signed fixed-point elevation in centimeters:
//!
//! | raw                   | meaning                       |
//! |-----------------------|-------------------------------|
//! | `0x000000..=0x7FFFFF` | `raw` (non-negative)          |
//! | `0x800000`            | no data                       |
//! | `0x800001..=0xFFFFFF` | `raw - 0x1000000` (negative)  |
//!
//! [`encode_mapbox`] re-packs a decoded value into the Terrain-RGB layout
//! (`0.1 m` steps offset by `-10000 m`).

use std::cmp::Ordering;

use image::Rgba;

/// Raw value reserved for "no data".
pub const NO_DATA_RAW: u32 = 0x80_0000;

/// RGB triplet of the no-data sentinel.
pub const NO_DATA_RGB: [u8; 3] = [0x80, 0x00, 0x00];

/// Opaque pixel carrying the no-data sentinel.
///
/// Used both to seed padded rasters and as the fallback source tile.
pub const NO_DATA_PIXEL: Rgba<u8> = Rgba([0x80, 0x00, 0x00, 0xFF]);

const WRAP: i32 = 0x100_0000;

/// Decode an RGB triplet into signed centimeters.
///
/// Returns `None` for the no-data sentinel. This is the only place that
/// decides whether a pixel carries data.
#[inline]
pub fn decode(r: u8, g: u8, b: u8) -> Option<i32> {
    let raw = ((r as i32) << 16) | ((g as i32) << 8) | b as i32;

    match raw.cmp(&(NO_DATA_RAW as i32)) {
        Ordering::Less => Some(raw),
        Ordering::Equal => None,
        Ordering::Greater => Some(raw - WRAP),
    }
}

/// Decode the RGB channels of a pixel; alpha is ignored.
#[inline]
pub fn decode_pixel(pixel: &Rgba<u8>) -> Option<i32> {
    let [r, g, b, _] = pixel.0;
    decode(r, g, b)
}

/// Pack signed centimeters back into an RGB triplet.
///
/// Inverse of [`decode`]: `None` yields the no-data sentinel. Values outside
/// `-0x7FFFFF..=0x7FFFFF` are truncated to 24 bits.
#[inline]
pub fn encode(raw: Option<i32>) -> [u8; 3] {
    let packed = match raw {
        None => NO_DATA_RAW,
        Some(v) if v < 0 => (v + WRAP) as u32,
        Some(v) => v as u32,
    };
    split_24(packed)
}

/// Re-encode signed centimeters as Terrain-RGB.
///
/// Computes `floor(0.1 * raw + 100000)` and emits its low 24 bits. Negative
/// intermediates keep their two's-complement bit pattern.
#[inline]
pub fn encode_mapbox(raw: i32) -> [u8; 3] {
    let value = (0.1 * raw as f64 + 100_000.0).floor() as i64;
    split_24(value as u32)
}

#[inline]
fn split_24(value: u32) -> [u8; 3] {
    [
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    ]
}
