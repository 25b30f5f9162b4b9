//! DEM Streamer - terrain renderings from RGB-packed elevation tiles.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dem_streamer::{
    config::Config,
    io::{HttpTileSource, SourceCache},
    render::Transform,
    server::{create_router, RouterConfig},
    tile::{LayerCatalog, TileCache, TileService},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let catalog = LayerCatalog::new(config.upstream(), config.layers());

    info!("Configuration:");
    info!("  Upstream: {}", catalog.upstream());
    info!(
        "  Layers: {}",
        catalog.layers().collect::<Vec<_>>().join(", ")
    );
    info!(
        "  Cache: {} source tiles, {}MB rendered tiles",
        config.cache_sources,
        config.cache_tiles / (1024 * 1024)
    );
    info!("  Request timeout: {}s", config.request_timeout);

    let source = match HttpTileSource::new(config.request_timeout()) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sources = Arc::new(SourceCache::with_capacity(source, config.cache_sources));
    let tile_service = TileService::with_shared_sources(
        catalog,
        sources,
        TileCache::with_capacity(config.cache_tiles),
    );

    let router = create_router(tile_service, build_router_config(&config));

    let addr = config.bind_address();
    let example_layer = config.layers().next().unwrap_or("dem_png");

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/layers", addr);
    info!(
        "    curl http://{}/tiles/{}/12/3637/1612.png?type=hillshade",
        addr, example_layer
    );
    info!("");
    info!(
        "  Transforms: {}",
        Transform::ALL.map(|t| t.as_str()).join(", ")
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dem_streamer=debug,tower_http=debug"
    } else {
        "dem_streamer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}
