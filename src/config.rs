//! Configuration management for the DEM tile server.
//!
//! Settings come from command-line arguments via clap, with environment
//! variable fallbacks under the `DEM_` prefix and defaults for everything.
//!
//! # Environment Variables
//!
//! - `DEM_HOST` - Server bind address (default: 0.0.0.0)
//! - `DEM_PORT` - Server port (default: 3000)
//! - `DEM_UPSTREAM` - Base URL of the DEM tile server
//! - `DEM_LAYERS` - Comma-separated layers that may be requested
//! - `DEM_CACHE_SOURCES` - Decoded source tiles to retain (default: 512)
//! - `DEM_CACHE_TILES` - Encoded output cache size, e.g. `64MB` (default: 64MB)
//! - `DEM_REQUEST_TIMEOUT` - Upstream request timeout in seconds (default: 10)
//! - `DEM_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `DEM_CORS_ORIGINS` - Comma-separated allowed origins (default: any)

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::io::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_SOURCE_CACHE_CAPACITY};
use crate::tile::{DEFAULT_LAYERS, DEFAULT_UPSTREAM};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default output tile cache size.
pub const DEFAULT_TILE_CACHE_SIZE: &str = "64MB";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// DEM Streamer - terrain renderings from RGB-packed elevation tiles.
///
/// Proxies an upstream DEM PNG tile server and derives slope, curvature,
/// hillshade, contour and color-mapped elevation tiles on the fly.
#[derive(Parser, Debug, Clone)]
#[command(name = "dem-streamer")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "DEM_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "DEM_PORT")]
    pub port: u16,

    // =========================================================================
    // Upstream Configuration
    // =========================================================================
    /// Base URL of the upstream DEM tile server.
    ///
    /// Tiles are fetched from `{upstream}/{layer}/{z}/{x}/{y}.png`.
    #[arg(long, default_value = DEFAULT_UPSTREAM, env = "DEM_UPSTREAM")]
    pub upstream: String,

    /// Layers that may be requested (comma-separated).
    #[arg(
        long,
        env = "DEM_LAYERS",
        value_delimiter = ',',
        default_values_t = DEFAULT_LAYERS.map(String::from)
    )]
    pub layers: Vec<String>,

    /// Upstream request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(), env = "DEM_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum number of decoded source tiles to keep in cache.
    #[arg(long, default_value_t = DEFAULT_SOURCE_CACHE_CAPACITY, env = "DEM_CACHE_SOURCES")]
    pub cache_sources: usize,

    /// Size of the encoded tile cache (e.g. "64MB", "512KB", or plain bytes).
    #[arg(
        long,
        default_value = DEFAULT_TILE_CACHE_SIZE,
        env = "DEM_CACHE_TILES",
        value_parser = parse_size
    )]
    pub cache_tiles: usize,

    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "DEM_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "DEM_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        let upstream = Url::parse(&self.upstream)
            .map_err(|e| format!("Invalid upstream URL {:?}: {}", self.upstream, e))?;
        if !matches!(upstream.scheme(), "http" | "https") {
            return Err(format!(
                "Upstream URL must use http or https, got {:?}",
                upstream.scheme()
            ));
        }

        if self.layers().next().is_none() {
            return Err("At least one layer is required. Set --layers or DEM_LAYERS".to_string());
        }

        if self.cache_sources == 0 {
            return Err("cache_sources must be greater than 0".to_string());
        }
        if self.cache_tiles == 0 {
            return Err("cache_tiles must be greater than 0".to_string());
        }
        if self.request_timeout == 0 {
            return Err("request_timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upstream base URL without a trailing slash.
    pub fn upstream(&self) -> &str {
        self.upstream.trim_end_matches('/')
    }

    /// Configured layers, trimmed, with blanks dropped.
    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.layers
            .iter()
            .map(|layer| layer.trim())
            .filter(|layer| !layer.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Parse a byte size such as `64MB`, `512KB`, `1GB` or `1048576`.
///
/// Units are binary (1KB = 1024 bytes) and case-insensitive.
pub fn parse_size(value: &str) -> Result<usize, String> {
    let value = value.trim();
    let upper = value.to_ascii_uppercase();

    let (digits, multiplier) = if let Some(n) = upper.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = upper.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = upper.strip_suffix('B') {
        (n, 1)
    } else {
        (upper.as_str(), 1)
    };

    let count: usize = digits
        .trim()
        .parse()
        .map_err(|_| format!("Invalid size {:?}: expected e.g. 64MB", value))?;

    count
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size {:?} is too large", value))
}

// =============================================================================
// Tests
// =============================================================================
