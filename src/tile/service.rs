//! Tile Service for orchestrating tile rendering.
//!
//! The TileService is the main entry point for tile requests. It orchestrates:
//! - Layer validation
//! - Cache lookups
//! - Source retrieval (one tile, or nine through the assembler)
//! - Rendering
//! - PNG encoding and result caching
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         TileService                             │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                    get_tile()                           │    │
//! │  │  1. Resolve layer     4. Render transform               │    │
//! │  │  2. Check cache       5. Encode PNG                     │    │
//! │  │  3. Fetch source(s)   6. Cache & return                 │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │        │              │                 │              │        │
//! │        ▼              ▼                 ▼              ▼        │
//! │  ┌───────────┐ ┌─────────────┐ ┌──────────────┐ ┌────────────┐  │
//! │  │ TileCache │ │ SourceCache │ │ TileAssembler│ │ PngEncoder │  │
//! │  └───────────┘ └─────────────┘ └──────────────┘ └────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use tracing::debug;

use crate::dem::Raster;
use crate::error::TileError;
use crate::io::{SourceCache, TileSource};
use crate::render::{self, RenderParams, Transform};

use super::address::{LayerCatalog, TileAddress, TileUrl};
use super::assembler::{AssembleOptions, TileAssembler};
use super::cache::{TileCache, TileCacheKey};
use super::encoder::PngTileEncoder;

// =============================================================================
// Tile Request
// =============================================================================

/// A request for a rendered tile.
#[derive(Debug, Clone)]
pub struct TileRequest {
    /// Source layer, e.g. `dem_png`
    pub layer: String,

    /// Tile address
    pub address: TileAddress,

    /// Rendering to apply
    pub transform: Transform,

    /// Optional render parameters
    pub params: RenderParams,
}

impl TileRequest {
    /// Create a new tile request with default parameters.
    pub fn new(layer: impl Into<String>, address: TileAddress, transform: Transform) -> Self {
        Self::with_params(layer, address, transform, RenderParams::default())
    }

    /// Create a new tile request with explicit parameters.
    pub fn with_params(
        layer: impl Into<String>,
        address: TileAddress,
        transform: Transform,
        params: RenderParams,
    ) -> Self {
        Self {
            layer: layer.into(),
            address,
            transform,
            params,
        }
    }
}

// =============================================================================
// Tile Response
// =============================================================================

/// Response from the tile service.
#[derive(Debug, Clone)]
pub struct TileResponse {
    /// The encoded PNG tile data
    pub data: Bytes,

    /// Whether this tile was served from cache
    pub cache_hit: bool,
}

// =============================================================================
// Tile Service
// =============================================================================

/// Service for rendering and caching tiles.
///
/// # Type Parameters
///
/// * `S` - The tile source (e.g. [`HttpTileSource`](crate::io::HttpTileSource))
///
/// # Example
///
/// ```ignore
/// use dem_streamer::io::HttpTileSource;
/// use dem_streamer::render::Transform;
/// use dem_streamer::tile::{LayerCatalog, TileAddress, TileRequest, TileService};
///
/// let source = HttpTileSource::new(std::time::Duration::from_secs(10))?;
/// let service = TileService::new(LayerCatalog::default(), source);
///
/// let request = TileRequest::new("dem_png", TileAddress::new(12, 3637, 1612), Transform::Slope);
/// let response = service.get_tile(request).await?;
///
/// println!("Tile size: {} bytes, cache hit: {}", response.data.len(), response.cache_hit);
/// ```
pub struct TileService<S> {
    /// Layers that may be requested
    catalog: LayerCatalog,

    /// Decoded source tiles
    sources: Arc<SourceCache<S>>,

    /// Padded DEM builder over `sources`
    assembler: TileAssembler<S>,

    /// Cache for encoded output tiles
    cache: TileCache,

    /// PNG encoder
    encoder: PngTileEncoder,
}

impl<S: TileSource + 'static> TileService<S> {
    /// Create a new tile service with default cache settings.
    pub fn new(catalog: LayerCatalog, source: S) -> Self {
        Self::with_shared_sources(catalog, Arc::new(SourceCache::new(source)), TileCache::new())
    }

    /// Create a new tile service over a shared source cache.
    pub fn with_shared_sources(
        catalog: LayerCatalog,
        sources: Arc<SourceCache<S>>,
        cache: TileCache,
    ) -> Self {
        Self {
            catalog,
            assembler: TileAssembler::new(Arc::clone(&sources)),
            sources,
            cache,
            encoder: PngTileEncoder::new(),
        }
    }

    /// Get a tile, using cache when available.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The layer is not in the catalog
    /// - The transform cannot run on the assembled raster
    /// - The result cannot be encoded
    ///
    /// Upstream failures are not errors: missing source tiles render as
    /// no-data.
    pub async fn get_tile(&self, request: TileRequest) -> Result<TileResponse, TileError> {
        let url = self.catalog.resolve(&request.layer, request.address)?;

        let cache_key = TileCacheKey::new(
            request.layer.as_str(),
            request.address,
            request.transform,
            request.params.fingerprint(),
        );

        if let Some(cached_data) = self.cache.get(&cache_key).await {
            return Ok(TileResponse {
                data: cached_data,
                cache_hit: true,
            });
        }

        let image = self
            .render_tile(&url, request.transform, &request.params)
            .await?;
        let tile_data = self.encoder.encode(&image)?;

        self.cache.put(cache_key, tile_data.clone()).await;

        Ok(TileResponse {
            data: tile_data,
            cache_hit: false,
        })
    }

    /// Render a tile without consulting or filling the output cache.
    pub async fn render_tile(
        &self,
        url: &TileUrl,
        transform: Transform,
        params: &RenderParams,
    ) -> Result<RgbaImage, TileError> {
        debug!(url = %url, transform = %transform, "rendering tile");

        let image = match transform {
            Transform::Mapbox => render::mapbox(&self.sources.fetch_tile(url).await.pixels),
            Transform::Elevation => {
                render::elevation(&self.sources.fetch_tile(url).await.pixels, params)
            }
            Transform::Slope => render::slope(&self.dem(url, true).await, params)?,
            Transform::Curvature => render::curvature(&self.dem(url, true).await, params)?,
            Transform::Hillshade => render::hillshade(&self.dem(url, true).await, params)?,
            Transform::Contour => render::contour(&self.dem(url, false).await, params)?,
        };

        Ok(image)
    }

    async fn dem(&self, url: &TileUrl, normalize: bool) -> Raster<f64> {
        let options = if normalize {
            AssembleOptions::normalized()
        } else {
            AssembleOptions::raw()
        };
        self.assembler.assemble(url, options).await
    }

    /// Get tile cache statistics.
    ///
    /// Returns `(current_size, capacity, entry_count)`.
    pub async fn cache_stats(&self) -> (usize, usize, usize) {
        let size = self.cache.size().await;
        let capacity = self.cache.capacity();
        let count = self.cache.len().await;
        (size, capacity, count)
    }

    /// Clear the output cache and the decoded source tiles.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        self.sources.clear();
    }

    /// Get the layer catalog.
    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Get the shared source cache.
    pub fn sources(&self) -> &Arc<SourceCache<S>> {
        &self.sources
    }
}

// =============================================================================
// Tests
// =============================================================================
