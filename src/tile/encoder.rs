//! PNG tile codec.
//!
//! The numeric core never touches compressed bytes. This module is the
//! boundary: upstream PNGs are decoded to RGBA pixels here, and rendered
//! rasters are encoded back to PNG. Packed elevation only survives a lossless
//! format, so no other codec is offered.

use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};

use crate::error::{IoError, TileError};

/// PNG encoder/decoder for tiles.
#[derive(Debug, Clone, Default)]
pub struct PngTileEncoder {}

impl PngTileEncoder {
    /// Create a new PNG tile encoder.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode PNG bytes into RGBA pixels.
    ///
    /// Grayscale, RGB and palette PNGs are expanded to RGBA; missing alpha
    /// becomes opaque.
    pub fn decode(&self, source: &[u8]) -> Result<RgbaImage, IoError> {
        let img = image::load_from_memory_with_format(source, ImageFormat::Png)
            .map_err(|e| IoError::Decode(e.to_string()))?;
        Ok(img.to_rgba8())
    }

    /// Encode RGBA pixels as PNG.
    pub fn encode(&self, raster: &RgbaImage) -> Result<Bytes, TileError> {
        let mut output = Vec::new();
        let (width, height) = raster.dimensions();

        PngEncoder::new(&mut output)
            .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
            .map_err(|e| TileError::EncodeError {
                message: e.to_string(),
            })?;

        Ok(Bytes::from(output))
    }
}

/// Check for the PNG signature.
#[inline]
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
}
