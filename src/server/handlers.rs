//! HTTP request handlers for the DEM tile API.
//!
//! # Endpoints
//!
//! - `GET /tiles/{layer}/{z}/{x}/{y}.png?type=...` - Serve a rendered tile
//! - `GET /layers` - Upstream and allowed layers
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{AddressError, TileError};
use crate::io::TileSource;
use crate::render::{parse_number, RenderParams, Transform};
use crate::tile::{TileAddress, TileRequest, TileService};

/// Response header reporting whether the output cache served the tile.
pub const CACHE_HIT_HEADER: HeaderName = HeaderName::from_static("x-tile-cache-hit");

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the tile service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S> {
    /// The tile service for processing tile requests
    pub tile_service: Arc<TileService<S>>,

    /// Cache-Control max-age in seconds (defaults to 1 hour)
    pub cache_max_age: u32,
}

impl<S: TileSource + 'static> AppState<S> {
    /// Create a new application state with the given tile service.
    pub fn new(tile_service: TileService<S>) -> Self {
        Self::with_cache_max_age(tile_service, 3600)
    }

    /// Create a new application state with custom cache max-age.
    pub fn with_cache_max_age(tile_service: TileService<S>, cache_max_age: u32) -> Self {
        Self {
            tile_service: Arc::new(tile_service),
            cache_max_age,
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            tile_service: Arc::clone(&self.tile_service),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Extracted from: `/tiles/{layer}/{z}/{x}/{filename}`
/// where filename is `{y}` or `{y}.png`. Coordinates are kept as text so
/// that malformed ones produce a JSON error rather than a bare rejection.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub layer: String,
    pub z: String,
    pub x: String,
    pub filename: String,
}

impl TilePathParams {
    /// Tile address, with any `.png` extension stripped from `y`.
    pub fn address(&self) -> Result<TileAddress, AddressError> {
        let y = self.filename.strip_suffix(".png").unwrap_or(&self.filename);
        TileAddress::parse(&self.z, &self.x, y)
    }
}

/// Query parameters for tile requests.
///
/// Every value arrives as text; see [`TileQueryParams::render_params`].
#[derive(Debug, Default, Deserialize)]
pub struct TileQueryParams {
    /// Transform name
    #[serde(rename = "type")]
    pub transform: Option<String>,

    pub colors: Option<String>,
    pub color: Option<String>,
    pub fallback: Option<String>,
    pub gain: Option<String>,
    pub low: Option<String>,
    pub high: Option<String>,
    pub interval: Option<String>,
    pub dir: Option<String>,
    pub alt: Option<String>,
}

impl TileQueryParams {
    /// The requested transform. Missing or unknown names are rejected.
    pub fn transform(&self) -> Result<Transform, TileError> {
        match &self.transform {
            Some(name) => name.parse(),
            None => Err(TileError::InvalidTransform { name: None }),
        }
    }

    /// Render parameters, rejecting numbers that do not parse.
    pub fn render_params(&self) -> Result<RenderParams, TileError> {
        Ok(RenderParams {
            colors: self.colors.clone(),
            color: self.color.clone(),
            fallback: self.fallback.clone(),
            gain: parse_number("gain", self.gain.as_deref())?,
            low: parse_number("low", self.low.as_deref())?,
            high: parse_number("high", self.high.as_deref())?,
            interval: parse_number("interval", self.interval.as_deref())?,
            dir: parse_number("dir", self.dir.as_deref())?,
            alt: parse_number("alt", self.alt.as_deref())?,
        })
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "unknown_layer", "invalid_transform")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from the layers endpoint.
#[derive(Debug, Serialize)]
pub struct LayersResponse {
    /// Upstream base URL
    pub upstream: String,

    /// Layers that may be requested
    pub layers: Vec<String>,

    /// Accepted values of the `type` parameter
    pub transforms: Vec<&'static str>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to HTTP response.
///
/// - 404s are logged at DEBUG level
/// - other 4xx errors are logged at WARN level
/// - 5xx errors are logged at ERROR level
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TileError::UnknownLayer { .. } => (StatusCode::NOT_FOUND, "unknown_layer"),
            TileError::InvalidTransform { .. } => (StatusCode::BAD_REQUEST, "invalid_transform"),
            TileError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "invalid_parameter"),
            TileError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "invalid_address"),
            TileError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "render_error"),
            TileError::EncodeError { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "encode_error"),
        };

        let message = match &self {
            TileError::InvalidTransform { .. } => format!(
                "{} (expected one of: {})",
                self,
                Transform::ALL.map(|t| t.as_str()).join(", ")
            ),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /tiles/{layer}/{z}/{x}/{y}.png`
///
/// # Query Parameters
///
/// - `type`: one of `mapbox`, `elevation`, `slope`, `curvature`,
///   `hillshade`, `contour` (required)
/// - `colors`, `color`, `fallback`: color specs; malformed values fall back
///   to the transform default
/// - `gain`, `low`, `high`, `interval`, `dir`, `alt`: numbers
///
/// # Response
///
/// - `200 OK`: PNG tile with `Content-Type: image/png`
/// - `400 Bad Request`: Invalid transform, parameter or coordinates
/// - `404 Not Found`: Layer not served
///
/// # Headers
///
/// - `Cache-Control: public, max-age={cache_max_age}`
/// - `X-Tile-Cache-Hit: true|false`
pub async fn tile_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
    Path(params): Path<TilePathParams>,
    Query(query): Query<TileQueryParams>,
) -> Result<Response, TileError> {
    let address = params.address()?;
    let transform = query.transform()?;
    let render_params = query.render_params()?;

    let request = TileRequest::with_params(params.layer, address, transform, render_params);
    let response = state.tile_service.get_tile(request).await?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CACHE_CONTROL,
            format!("public, max-age={}", state.cache_max_age),
        ),
        (CACHE_HIT_HEADER, response.cache_hit.to_string()),
    ];

    Ok((StatusCode::OK, headers, response.data).into_response())
}

/// Handle health check requests.
///
/// `200 OK` with `{"status": "healthy", "version": "..."}`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle layer listing requests.
pub async fn layers_handler<S: TileSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<LayersResponse> {
    let catalog = state.tile_service.catalog();
    Json(LayersResponse {
        upstream: catalog.upstream().to_string(),
        layers: catalog.layers().map(str::to_string).collect(),
        transforms: Transform::ALL.iter().map(Transform::as_str).collect(),
    })
}

// =============================================================================
// Tests
// =============================================================================
