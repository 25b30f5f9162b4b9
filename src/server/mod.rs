//! HTTP server layer.
//!
//! Exposes rendered DEM tiles over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │      GET /tiles/{layer}/{z}/{x}/{y}.png?type={transform}        │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌────────────────────────────┐   │
//! │  │        handlers          │  │          routes            │   │
//! │  │ (extract, map errors)    │  │  (CORS, tracing, state)    │   │
//! │  └──────────────────────────┘  └────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, layers_handler, tile_handler, AppState, ErrorResponse, HealthResponse,
    LayersResponse, TilePathParams, TileQueryParams, CACHE_HIT_HEADER,
};
pub use routes::{create_router, RouterConfig};
