use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use super::TileSource;
use crate::error::IoError;
use crate::tile::TileUrl;

/// Default per-request timeout for upstream tile fetches.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-backed implementation of [`TileSource`].
///
/// Issues a plain GET for each tile URL. Any non-2xx status is an error,
/// which includes the 404s upstream returns for tiles outside its coverage.
#[derive(Clone)]
pub struct HttpTileSource {
    client: Client,
}

impl HttpTileSource {
    /// Create a source with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, IoError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dem-streamer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IoError::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create a source around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    async fn fetch(&self, url: &TileUrl) -> Result<Bytes, IoError> {
        let url = url.to_string();
        debug!(url = %url, "fetching source tile");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IoError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| IoError::Connection(e.to_string()))
    }
}
