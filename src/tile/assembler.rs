//! Tile neighbor assembler.
//!
//! Convolution needs every output pixel to have a full 3x3 neighborhood, so
//! the assembler builds a raster slightly larger than the tile:
//!
//! ```text
//!          p        256        p
//!       ┌─────┬───────────────┬─────┐
//!     p │ NW  │       N       │ NE  │
//!       ├─────┼───────────────┼─────┤
//!       │     │               │     │
//!   256 │  W  │    center     │  E  │
//!       │     │               │     │
//!       ├─────┼───────────────┼─────┤
//!     p │ SW  │       S       │ SE  │
//!       └─────┴───────────────┴─────┘
//! ```
//!
//! All nine tiles are requested at once and the assembly waits for every one
//! of them. A neighbor that cannot be retrieved arrives as the no-data tile,
//! so its strip decodes to NaN and only the border cells it touches are lost.

use std::sync::Arc;

use futures::future::join_all;
use image::{imageops, RgbaImage};

use super::address::{TileUrl, MAX_ZOOM, TILE_SIZE};
use crate::dem::{decode_pixel, Raster, NO_DATA_PIXEL};
use crate::io::{SourceCache, SourceTile, TileSource};

/// `(dx, dy)` of the nine tiles, row by row from the north-west.
const NEIGHBOR_OFFSETS: [(i64, i64); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// How a padded elevation raster is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Border width taken from neighbors on each side
    pub padding: u32,

    /// Divide raw values by [`normalization_unit`] for the tile's zoom
    pub normalize: bool,
}

impl AssembleOptions {
    /// One-pixel border, normalized by zoom.
    pub fn normalized() -> Self {
        Self {
            padding: 1,
            normalize: true,
        }
    }

    /// One-pixel border, raw centimeter values.
    pub fn raw() -> Self {
        Self {
            padding: 1,
            normalize: false,
        }
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::normalized()
    }
}

/// Divisor that turns raw centimeters into slope-ready units at zoom `z`.
///
/// `500 * 2^(15 - z)`: at z=15 one unit is 5 m of height, and the unit
/// doubles with every zoom level out as the ground distance per pixel does.
/// Zoom levels beyond [`MAX_ZOOM`] are treated as [`MAX_ZOOM`].
pub fn normalization_unit(z: u32) -> f64 {
    500.0 * 2f64.powi(15 - z.min(MAX_ZOOM) as i32)
}

/// Builds padded, decoded elevation rasters from a tile and its neighbors.
pub struct TileAssembler<S> {
    sources: Arc<SourceCache<S>>,
}

impl<S: TileSource + 'static> TileAssembler<S> {
    /// Create an assembler retrieving tiles through `sources`.
    pub fn new(sources: Arc<SourceCache<S>>) -> Self {
        Self { sources }
    }

    /// Assemble the padded elevation raster around `url`.
    ///
    /// The result is `(256 + 2p) x (256 + 2p)`; the tile itself starts at
    /// `(p, p)`. No-data pixels decode to NaN.
    pub async fn assemble(&self, url: &TileUrl, options: AssembleOptions) -> Raster<f64> {
        let urls: Vec<TileUrl> = NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| url.neighbor(dx, dy))
            .collect();

        let tiles = join_all(urls.iter().map(|u| self.sources.fetch_tile(u))).await;

        let canvas = compose(&tiles, options.padding);
        let unit = if options.normalize {
            normalization_unit(url.address().z)
        } else {
            1.0
        };

        decode_raster(&canvas, unit)
    }
}

impl<S> Clone for TileAssembler<S> {
    fn clone(&self) -> Self {
        Self {
            sources: Arc::clone(&self.sources),
        }
    }
}

/// Paint nine tiles, given in [`NEIGHBOR_OFFSETS`] order, onto a padded
/// canvas seeded with no-data.
///
/// Each tile is placed at its natural offset and clipped to the canvas, so a
/// neighbor only contributes the strip that borders the center tile.
pub fn compose(tiles: &[SourceTile], padding: u32) -> RgbaImage {
    let size = TILE_SIZE + 2 * padding;
    let mut canvas = RgbaImage::from_pixel(size, size, NO_DATA_PIXEL);

    let step = TILE_SIZE as i64;
    let pad = padding as i64;

    for (tile, &(dx, dy)) in tiles.iter().zip(NEIGHBOR_OFFSETS.iter()) {
        imageops::replace(&mut canvas, tile.pixels.as_ref(), step * dx + pad, step * dy + pad);
    }

    canvas
}

/// Decode every pixel to elevation, dividing by `unit`.
pub fn decode_raster(image: &RgbaImage, unit: f64) -> Raster<f64> {
    let (width, height) = image.dimensions();
    Raster::from_fn(width as usize, height as usize, |x, y| {
        match decode_pixel(image.get_pixel(x as u32, y as u32)) {
            Some(raw) => raw as f64 / unit,
            None => f64::NAN,
        }
    })
}
