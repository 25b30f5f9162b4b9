//! Source tile retrieval.
//!
//! - [`TileSource`] - trait for fetching encoded tile bytes
//! - [`HttpTileSource`] - reqwest-backed upstream
//! - [`SourceCache`] - coalescing, never-failing decoded tile cache

mod http_source;
mod source_cache;
mod tile_source;

pub use http_source::{HttpTileSource, DEFAULT_REQUEST_TIMEOUT};
pub use source_cache::{fallback_tile, SourceCache, SourceTile, DEFAULT_SOURCE_CACHE_CAPACITY};
pub use tile_source::TileSource;
