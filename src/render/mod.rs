//! Render transforms.
//!
//! Each transform turns elevation into an RGBA tile:
//!
//! | Transform   | Input                    | Output                          |
//! |-------------|--------------------------|---------------------------------|
//! | `mapbox`    | the tile itself          | Terrain-RGB packed elevation    |
//! | `elevation` | the tile itself          | ramp over altitude              |
//! | `slope`     | padded, normalized DEM   | ramp over slope angle           |
//! | `curvature` | padded, normalized DEM   | ramp over curvature angle       |
//! | `hillshade` | padded, normalized DEM   | ramp over illumination angle    |
//! | `contour`   | padded, raw DEM          | fixed color on contour lines    |
//!
//! No-data always renders as the `fallback` color. Colors are parsed per
//! request; a spec that does not parse is replaced by the transform default.

mod contour;
mod elevation;
mod terrain;

pub use contour::{contour, DEFAULT_CONTOUR_COLOR, DEFAULT_INTERVAL};
pub use elevation::{elevation, mapbox};
pub use terrain::{curvature, hillshade, slope, EW_KERNEL, LAPLACIAN_KERNEL, NS_KERNEL};

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::dem::{parse_color, ColorRamp, Raster};
use crate::error::TileError;

/// Fallback color when none is given: transparent black.
pub const DEFAULT_FALLBACK: &str = "00000000";

/// The six renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Mapbox,
    Elevation,
    Slope,
    Curvature,
    Hillshade,
    Contour,
}

impl Transform {
    pub const ALL: [Transform; 6] = [
        Transform::Mapbox,
        Transform::Elevation,
        Transform::Slope,
        Transform::Curvature,
        Transform::Hillshade,
        Transform::Contour,
    ];

    /// Name used in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Mapbox => "mapbox",
            Transform::Elevation => "elevation",
            Transform::Slope => "slope",
            Transform::Curvature => "curvature",
            Transform::Hillshade => "hillshade",
            Transform::Contour => "contour",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transform {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TileError::InvalidTransform {
                name: Some(s.to_string()),
            })
    }
}

/// Optional render parameters as received with a request.
///
/// Numeric values are validated when the request is parsed (see
/// [`parse_number`]). Color values stay as text and are resolved by each
/// transform against its own default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderParams {
    pub colors: Option<String>,
    pub color: Option<String>,
    pub fallback: Option<String>,
    pub gain: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub interval: Option<f64>,
    pub dir: Option<f64>,
    pub alt: Option<f64>,
}

impl RenderParams {
    /// Canonical text of the parameters that were given, in a fixed order.
    ///
    /// Two requests with equal fingerprints render identically, which makes
    /// this suitable as part of an output cache key.
    pub fn fingerprint(&self) -> String {
        let texts = [
            ("colors", self.colors.clone()),
            ("color", self.color.clone()),
            ("fallback", self.fallback.clone()),
        ];
        let numbers = [
            ("gain", self.gain),
            ("low", self.low),
            ("high", self.high),
            ("interval", self.interval),
            ("dir", self.dir),
            ("alt", self.alt),
        ];

        texts
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, v)))
            .chain(
                numbers
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| format!("{}={}", k, v))),
            )
            .collect::<Vec<_>>()
            .join("&")
    }

    /// The `colors` ramp, or `default` when absent or malformed.
    pub fn ramp_or(&self, default: &str) -> ColorRamp {
        if let Some(spec) = &self.colors {
            match ColorRamp::parse(spec) {
                Ok(ramp) => return ramp,
                Err(e) => debug!(error = %e, "using default color ramp"),
            }
        }
        ColorRamp::parse(default).unwrap_or_default()
    }

    /// The `color` parameter, or `default` when absent or malformed.
    pub fn color_or(&self, default: &str) -> Rgba<u8> {
        resolve_color(self.color.as_deref(), default)
    }

    /// The `fallback` color used for no-data.
    pub fn fallback_color(&self) -> Rgba<u8> {
        resolve_color(self.fallback.as_deref(), DEFAULT_FALLBACK)
    }

    pub fn gain_or(&self, default: f64) -> f64 {
        self.gain.unwrap_or(default)
    }

    /// `(low, high)` with per-transform defaults.
    pub fn range_or(&self, low: f64, high: f64) -> (f64, f64) {
        (self.low.unwrap_or(low), self.high.unwrap_or(high))
    }
}

fn resolve_color(value: Option<&str>, default: &str) -> Rgba<u8> {
    if let Some(token) = value {
        match parse_color(token) {
            Ok(color) => return color,
            Err(e) => debug!(error = %e, "using default color"),
        }
    }
    parse_color(default).unwrap_or(Rgba([0, 0, 0, 0]))
}

/// Parse an optional numeric query parameter.
///
/// Absent means `None`. Present values must be finite decimal numbers.
pub fn parse_number(name: &'static str, value: Option<&str>) -> Result<Option<f64>, TileError> {
    let Some(text) = value else {
        return Ok(None);
    };

    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| TileError::InvalidParameter {
            name,
            value: text.to_string(),
        })
}

/// Clamp `value` into `[min, max]`, swapping the bounds if reversed.
///
/// NaN passes through unchanged.
pub fn clip(value: f64, min: f64, max: f64) -> f64 {
    let (min, max) = if max < min { (max, min) } else { (min, max) };
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Ramp index of `value` over `[low, high]`.
///
/// `floor(255 * (value - low) / (high - low))` clipped to `0..=255`. `None`
/// when the result is NaN, which covers no-data and an empty `low == high`
/// range at `value == low`.
pub fn ramp_index(value: f64, low: f64, high: f64) -> Option<u8> {
    let index = (255.0 * (value - low) / (high - low)).floor();
    if index.is_nan() {
        return None;
    }
    Some(clip(index, 0.0, 255.0) as u8)
}

/// A ramp over a value range, with a color for no-data.
#[derive(Debug, Clone)]
pub struct Palette {
    pub ramp: ColorRamp,
    pub fallback: Rgba<u8>,
    pub low: f64,
    pub high: f64,
}

impl Palette {
    pub fn color(&self, value: f64) -> Rgba<u8> {
        match ramp_index(value, self.low, self.high) {
            Some(index) => self.ramp.color(index),
            None => self.fallback,
        }
    }
}

/// Paint an image the size of `raster`, one pixel per sample index.
pub(crate) fn paint<T>(raster: &Raster<T>, mut pixel: impl FnMut(usize) -> Rgba<u8>) -> RgbaImage {
    let width = raster.width();
    RgbaImage::from_fn(width as u32, raster.height() as u32, |x, y| {
        pixel(y as usize * width + x as usize)
    })
}
