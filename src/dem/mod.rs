//! Numeric core for RGB-packed elevation tiles.
//!
//! Everything in here is pure and synchronous:
//!
//! - [`codec`] - pack/unpack 24-bit signed elevation to and from RGB
//! - [`raster`] - row-major rasters and the 3x3 convolution engine
//! - [`ramp`] - color-stop parsing into 256-entry lookup tables

pub mod codec;
pub mod ramp;
pub mod raster;

pub use codec::{
    decode, decode_pixel, encode, encode_mapbox, NO_DATA_PIXEL, NO_DATA_RAW, NO_DATA_RGB,
};
pub use ramp::{parse_color, ColorRamp, ColorStop, RAMP_SIZE};
pub use raster::Raster;
