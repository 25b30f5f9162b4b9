use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use image::RgbaImage;
use lru::LruCache;
use tracing::{debug, warn};

use super::TileSource;
use crate::dem::NO_DATA_PIXEL;
use crate::tile::{PngTileEncoder, TileUrl, TILE_SIZE};

/// Default number of decoded source tiles to retain.
pub const DEFAULT_SOURCE_CACHE_CAPACITY: usize = 512;

/// A decoded source tile.
#[derive(Debug, Clone)]
pub struct SourceTile {
    /// RGBA pixels of the tile
    pub pixels: Arc<RgbaImage>,

    /// True when retrieval or decoding failed and this is the no-data tile
    pub fallback: bool,
}

type PendingTile = Shared<BoxFuture<'static, SourceTile>>;

/// Coalescing cache in front of a [`TileSource`].
///
/// This is the tile-retrieval capability the assembler depends on:
/// - Never fails: any fetch or decode error yields a solid no-data tile
/// - Singleflight: concurrent requests for the same URL share one fetch
/// - LRU retention of completed tiles, including fallbacks, so a missing
///   neighbor is not re-requested for every tile that borders it
///
/// A pending fetch is a shared future, so it keeps making progress as long
/// as any requester is still awaiting it. If every requester goes away the
/// fetch stays parked in the in-flight map and resumes on the next request.
pub struct SourceCache<S> {
    /// The underlying source
    source: Arc<S>,
    /// Completed tiles indexed by URL
    completed: Mutex<LruCache<String, SourceTile>>,
    /// In-flight fetches indexed by URL
    in_flight: Mutex<HashMap<String, PendingTile>>,
    /// Tile substituted for failed retrievals
    fallback: Arc<RgbaImage>,
}

impl<S: TileSource + 'static> SourceCache<S> {
    /// Create a cache with the default capacity.
    pub fn new(source: S) -> Self {
        Self::with_capacity(source, DEFAULT_SOURCE_CACHE_CAPACITY)
    }

    /// Create a cache retaining at most `capacity` completed tiles.
    pub fn with_capacity(source: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source: Arc::new(source),
            completed: Mutex::new(LruCache::new(capacity)),
            in_flight: Mutex::new(HashMap::new()),
            fallback: Arc::new(fallback_tile()),
        }
    }

    /// Get a decoded tile, fetching it if needed.
    pub async fn fetch_tile(&self, url: &TileUrl) -> SourceTile {
        let key = url.to_string();

        let pending = {
            let mut in_flight = lock(&self.in_flight);
            if let Some(tile) = lock(&self.completed).get(&key) {
                return tile.clone();
            }
            in_flight
                .entry(key.clone())
                .or_insert_with(|| self.spawn_load(url.clone()))
                .clone()
        };

        let tile = pending.await;

        // Whoever observes completion first moves the result into the LRU.
        let mut in_flight = lock(&self.in_flight);
        if in_flight.remove(&key).is_some() {
            lock(&self.completed).put(key, tile.clone());
        }

        tile
    }

    fn spawn_load(&self, url: TileUrl) -> PendingTile {
        let source = Arc::clone(&self.source);
        let fallback = Arc::clone(&self.fallback);

        async move {
            let decoded = match source.fetch(&url).await {
                Ok(bytes) => PngTileEncoder::new().decode(&bytes),
                Err(e) => Err(e),
            };

            match decoded {
                Ok(pixels) => {
                    debug!(url = %url, "source tile loaded");
                    SourceTile {
                        pixels: Arc::new(pixels),
                        fallback: false,
                    }
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "source tile unavailable, using no-data tile");
                    SourceTile {
                        pixels: fallback,
                        fallback: true,
                    }
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Number of completed tiles retained.
    pub fn len(&self) -> usize {
        lock(&self.completed).len()
    }

    /// Check if no completed tiles are retained.
    pub fn is_empty(&self) -> bool {
        lock(&self.completed).is_empty()
    }

    /// Drop all completed tiles. In-flight fetches are unaffected.
    pub fn clear(&self) {
        lock(&self.completed).clear();
    }
}

/// Solid no-data tile.
pub fn fallback_tile() -> RgbaImage {
    RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE, NO_DATA_PIXEL)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
