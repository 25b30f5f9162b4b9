//! Tile service layer.
//!
//! This module turns a tile request into a rendered PNG.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              Tile Service               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileCache   │  │  TileAssembler  │  │
//! │  │  (encoded    │  │  (9 tiles →     │  │
//! │  │   PNGs)      │  │   padded DEM)   │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │        SourceCache → TileSource         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileService`]: Main entry point for tile requests
//! - [`TileAssembler`]: Stitches a tile and its neighbors into a padded DEM
//! - [`TileCache`]: LRU cache for encoded PNG tiles with size-based eviction
//! - [`TileCacheKey`]: Composite key (layer, address, transform, parameters)
//! - [`PngTileEncoder`]: PNG decode and encode
//! - [`TileUrl`], [`TileAddress`], [`LayerCatalog`]: Addressing

mod address;
mod assembler;
mod cache;
mod encoder;
mod service;

pub use address::{
    LayerCatalog, TileAddress, TileUrl, DEFAULT_LAYERS, DEFAULT_UPSTREAM, MAX_ZOOM, TILE_SIZE,
};
pub use assembler::{compose, decode_raster, normalization_unit, AssembleOptions, TileAssembler};
pub use cache::{TileCache, TileCacheKey, DEFAULT_TILE_CACHE_CAPACITY};
pub use encoder::{is_png, PngTileEncoder};
pub use service::{TileRequest, TileResponse, TileService};
