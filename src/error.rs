use thiserror::Error;

/// Errors that can occur while retrieving a source tile from upstream
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Tile bytes could not be decoded into pixels
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors raised while parsing color and color-ramp specifications
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Token is not 3, 4, 6 or 8 lowercase hex digits
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Ramp spec is malformed (too few stops, mixed modes, bad token)
    #[error("Invalid color ramp {spec:?}: {reason}")]
    InvalidRamp { spec: String, reason: &'static str },
}

/// Errors raised while parsing a tile path of the form `.../{z}/{x}/{y}.png`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Path does not end in `/{z}/{x}/{y}.png`
    #[error("Not a DEM tile path: {0}")]
    InvalidPath(String),
}

/// Errors from the convolution engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Interior iteration needs at least a 3x3 raster
    #[error("Raster too small for a 3x3 neighborhood: {width}x{height}")]
    TooSmall { width: usize, height: usize },

    /// Sample count disagrees with the declared dimensions
    #[error("Raster has {actual} samples, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Errors from a render transform
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Errors that can occur while serving a rendered tile
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Layer is not in the configured catalog
    #[error("Unknown layer: {layer}")]
    UnknownLayer { layer: String },

    /// `type` parameter missing or not a known transform
    #[error("Invalid transform: {name:?}")]
    InvalidTransform { name: Option<String> },

    /// A numeric parameter failed to parse
    #[error("Invalid value for parameter {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    /// Tile coordinates could not be parsed
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    /// Transform failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Output raster could not be encoded
    #[error("Encode error: {message}")]
    EncodeError { message: String },
}
