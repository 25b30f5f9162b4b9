//! # DEM Streamer
//!
//! A tile server that renders terrain products from RGB-packed elevation
//! tiles on the fly.
//!
//! Each request names an upstream DEM PNG tile and a transform. The service
//! fetches the tile (and, for kernel-based transforms, its eight neighbors),
//! decodes elevations, and renders one of:
//!
//! - **mapbox**: re-pack elevation in Mapbox Terrain-RGB
//! - **elevation**: color ramp over altitude
//! - **slope** / **curvature**: color ramp over a 3x3 kernel result
//! - **hillshade**: color ramp over the illumination angle
//! - **contour**: lines at a fixed elevation interval
//!
//! ## Architecture
//!
//! - [`dem`] - elevation codec, rasters with 3x3 convolution, color ramps
//! - [`render`] - the six transforms and their parameters
//! - [`io`] - upstream retrieval with a coalescing source tile cache
//! - [`tile`] - addressing, neighbor assembly, output cache and service
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use dem_streamer::{create_router, HttpTileSource, LayerCatalog, RouterConfig, TileService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpTileSource::new(Duration::from_secs(10))?;
//!     let tile_service = TileService::new(LayerCatalog::default(), source);
//!     let router = create_router(tile_service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dem;
pub mod error;
pub mod io;
pub mod render;
pub mod server;
pub mod tile;

// Re-export commonly used types
pub use config::Config;
pub use dem::{ColorRamp, Raster};
pub use error::{AddressError, ColorError, IoError, RasterError, RenderError, TileError};
pub use io::{HttpTileSource, SourceCache, TileSource};
pub use render::{RenderParams, Transform};
pub use server::{create_router, AppState, RouterConfig};
pub use tile::{LayerCatalog, TileAddress, TileCache, TileRequest, TileResponse, TileService, TileUrl};
