//! Output cache for rendered PNG tiles.
//!
//! Rendering a convolution transform touches nine source tiles and a few
//! hundred thousand floating-point operations, so finished tiles are kept
//! as encoded bytes and served directly on repeat requests.
//!
//! # Cache Key
//!
//! Tiles are cached by a composite key including:
//! - Layer name
//! - Tile address (z, x, y)
//! - Transform
//! - Parameter fingerprint (see [`RenderParams::fingerprint`])
//!
//! # Size-Based Eviction
//!
//! The cache tracks the total size of cached tiles in bytes and evicts
//! least-recently-used entries when the capacity is exceeded.
//!
//! [`RenderParams::fingerprint`]: crate::render::RenderParams::fingerprint

use std::num::NonZeroUsize;
use std::sync::Arc;

use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;

use super::address::TileAddress;
use crate::render::Transform;

/// Default cache capacity: 64MB
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// Upper bound on entries regardless of their size
const DEFAULT_MAX_ENTRIES: usize = 10_000;

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for rendered tiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCacheKey {
    /// Source layer
    pub layer: Arc<str>,

    /// Tile address
    pub address: TileAddress,

    /// Rendering applied
    pub transform: Transform,

    /// Canonical text of the render parameters
    pub params: Arc<str>,
}

impl TileCacheKey {
    /// Create a new cache key.
    pub fn new(
        layer: impl Into<Arc<str>>,
        address: TileAddress,
        transform: Transform,
        params: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            layer: layer.into(),
            address,
            transform,
            params: params.into(),
        }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// LRU cache for encoded PNG tiles with size-based capacity.
///
/// The cache is thread-safe and can be shared across async tasks via `Arc`.
///
/// # Example
///
/// ```
/// use dem_streamer::render::Transform;
/// use dem_streamer::tile::{TileAddress, TileCache, TileCacheKey};
/// use bytes::Bytes;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::new();
///
///     let key = TileCacheKey::new("dem_png", TileAddress::new(12, 3637, 1612), Transform::Slope, "");
///     let png = Bytes::from_static(&[0x89, b'P', b'N', b'G']);
///
///     cache.put(key.clone(), png.clone()).await;
///     assert_eq!(cache.get(&key).await, Some(png));
/// }
/// ```
pub struct TileCache {
    cache: RwLock<LruCache<TileCacheKey, Bytes>>,

    /// Maximum total size in bytes
    max_size: usize,

    /// Current total size in bytes
    current_size: RwLock<usize>,
}

impl TileCache {
    /// Create a new tile cache with default capacity (64MB).
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a new tile cache holding at most `max_size` bytes.
    pub fn with_capacity(max_size: usize) -> Self {
        Self::with_capacity_and_entries(max_size, DEFAULT_MAX_ENTRIES)
    }

    /// Create a new tile cache with a byte capacity and an entry limit.
    pub fn with_capacity_and_entries(max_size: usize, max_entries: usize) -> Self {
        let max_entries = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(max_entries)),
            max_size,
            current_size: RwLock::new(0),
        }
    }

    /// Get a tile, marking it as recently used.
    pub async fn get(&self, key: &TileCacheKey) -> Option<Bytes> {
        let mut cache = self.cache.write().await;
        cache.get(key).cloned()
    }

    /// Store a tile, evicting least-recently-used entries while over capacity.
    ///
    /// A tile larger than the whole capacity is not retained.
    pub async fn put(&self, key: TileCacheKey, data: Bytes) {
        let data_size = data.len();
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;

        // Returns the replaced value for an existing key, or the entry pushed
        // out by the entry limit.
        if let Some((_, evicted)) = cache.push(key, data) {
            *current_size = current_size.saturating_sub(evicted.len());
        }
        *current_size += data_size;

        while *current_size > self.max_size {
            match cache.pop_lru() {
                Some((_, evicted)) => *current_size = current_size.saturating_sub(evicted.len()),
                None => break,
            }
        }
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        let mut current_size = self.current_size.write().await;
        cache.clear();
        *current_size = 0;
    }

    /// Get the current number of cached tiles.
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Get the current total size of cached tiles in bytes.
    pub async fn size(&self) -> usize {
        *self.current_size.read().await
    }

    /// Get the maximum capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
