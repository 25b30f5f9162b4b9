//! Tile addressing.
//!
//! Source tiles live at `{prefix}/{z}/{x}/{y}.png`. Neighbors are derived by
//! offsetting `x` and `y` without wrapping or clamping, so a neighbor of an
//! edge tile may name a tile that does not exist upstream; retrieval then
//! falls back like any other failure.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AddressError, TileError};

/// Edge length of a source tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level accepted in a tile path.
pub const MAX_ZOOM: u32 = 30;

/// Upstream serving the GSI DEM PNG datasets.
pub const DEFAULT_UPSTREAM: &str = "https://cyberjapandata.gsi.go.jp/xyz";

/// Datasets served by [`DEFAULT_UPSTREAM`].
pub const DEFAULT_LAYERS: [&str; 6] = [
    "dem_png",
    "dem5a_png",
    "dem5b_png",
    "dem5c_png",
    "dem1a_png",
    "demgm_png",
];

/// A `(z, x, y)` tile in the slippy-map pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    pub z: u32,
    pub x: i64,
    pub y: i64,
}

impl TileAddress {
    pub fn new(z: u32, x: i64, y: i64) -> Self {
        Self { z, x, y }
    }

    /// Parse decimal `z`, `x` and `y` components.
    ///
    /// `z` must not exceed [`MAX_ZOOM`], and `x` and `y` must lie inside the
    /// `2^z` by `2^z` grid of that zoom level.
    pub fn parse(z: &str, x: &str, y: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidPath(format!("{}/{}/{}", z, x, y));

        let z = parse_coordinate(z)
            .and_then(|z| u32::try_from(z).ok())
            .filter(|z| *z <= MAX_ZOOM)
            .ok_or_else(invalid)?;
        let extent = 1i64 << z;
        let x = parse_coordinate(x)
            .filter(|x| *x < extent)
            .ok_or_else(invalid)?;
        let y = parse_coordinate(y)
            .filter(|y| *y < extent)
            .ok_or_else(invalid)?;

        Ok(Self::new(z, x, y))
    }

    /// Address offset by `(dx, dy)` at the same zoom, saturating at the
    /// bounds of `i64`.
    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self {
            z: self.z,
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Full location of a source tile: dataset prefix plus address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileUrl {
    prefix: String,
    address: TileAddress,
}

impl TileUrl {
    pub fn new(prefix: impl Into<String>, address: TileAddress) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('/') {
            prefix.pop();
        }
        Self { prefix, address }
    }

    /// Parse a URL or path ending in `/{z}/{x}/{y}.png`.
    ///
    /// Any query string or fragment is discarded first.
    pub fn parse(url: &str) -> Result<Self, AddressError> {
        let invalid = || AddressError::InvalidPath(url.to_string());

        let path = url.split(['?', '#']).next().unwrap_or_default();
        let stem = path.strip_suffix(".png").ok_or_else(invalid)?;

        let mut parts = stem.rsplitn(4, '/');
        let (Some(y), Some(x), Some(z), Some(prefix)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if prefix.is_empty() {
            return Err(invalid());
        }

        let address = TileAddress::parse(z, x, y).map_err(|_| invalid())?;
        Ok(Self::new(prefix, address))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn address(&self) -> TileAddress {
        self.address
    }

    /// The neighboring tile at `(dx, dy)`.
    pub fn neighbor(&self, dx: i64, dy: i64) -> Self {
        Self {
            prefix: self.prefix.clone(),
            address: self.address.offset(dx, dy),
        }
    }
}

impl fmt::Display for TileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TileAddress { z, x, y } = self.address;
        write!(f, "{}/{}/{}/{}.png", self.prefix, z, x, y)
    }
}

/// Coordinates are plain decimal digits; signs are not accepted.
fn parse_coordinate(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Upstream base URL and the datasets that may be proxied from it.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    upstream: String,
    layers: BTreeSet<String>,
}

impl LayerCatalog {
    pub fn new<I, L>(upstream: impl Into<String>, layers: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        let mut upstream = upstream.into();
        while upstream.ends_with('/') {
            upstream.pop();
        }
        Self {
            upstream,
            layers: layers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn layers(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(String::as_str)
    }

    pub fn contains(&self, layer: &str) -> bool {
        self.layers.contains(layer)
    }

    /// Source tile URL for `address` in `layer`.
    pub fn resolve(&self, layer: &str, address: TileAddress) -> Result<TileUrl, TileError> {
        if !self.contains(layer) {
            return Err(TileError::UnknownLayer {
                layer: layer.to_string(),
            });
        }
        Ok(TileUrl::new(
            format!("{}/{}", self.upstream, layer),
            address,
        ))
    }
}

impl Default for LayerCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_UPSTREAM, DEFAULT_LAYERS)
    }
}
