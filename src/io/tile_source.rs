use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IoError;
use crate::tile::TileUrl;

/// Trait for retrieving encoded source tiles.
///
/// Implementations return the raw (compressed) bytes of the tile at `url`.
/// Failures are reported as errors here; turning them into fallback tiles is
/// the job of [`SourceCache`](super::SourceCache).
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the encoded bytes of one tile.
    async fn fetch(&self, url: &TileUrl) -> Result<Bytes, IoError>;
}
