//! API integration tests for routes, status codes and headers.

use axum::body::Body;
use axum::http::{Request, StatusCode};

use dem_streamer::tile::TILE_SIZE;
use dem_streamer::RouterConfig;

use super::test_utils::{get, send, test_router, test_router_with_config, MockDemSource, LAYERS, UPSTREAM};

// =============================================================================
// Tile Retrieval
// =============================================================================

#[tokio::test]
async fn test_tile_retrieval_success() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/12/3637/1612.png?type=slope").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/png"));
    assert_eq!(response.header("cache-control"), Some("public, max-age=3600"));
    assert_eq!(response.header("x-tile-cache-hit"), Some("false"));
    assert_eq!(response.image().dimensions(), (TILE_SIZE, TILE_SIZE));
}

#[tokio::test]
async fn test_tile_retrieval_without_png_extension() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/12/3637/1612?type=mapbox").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("image/png"));
}

#[tokio::test]
async fn test_every_transform_is_served() {
    let router = test_router(MockDemSource::flat(10_000));

    for transform in ["mapbox", "elevation", "slope", "curvature", "hillshade", "contour"] {
        let uri = format!("/tiles/dem5a_png/14/14552/6451.png?type={}", transform);
        let response = get(&router, &uri).await;
        assert_eq!(response.status, StatusCode::OK, "{}", transform);
        assert_eq!(
            response.image().dimensions(),
            (TILE_SIZE, TILE_SIZE),
            "{}",
            transform
        );
    }
}

#[tokio::test]
async fn test_custom_cache_max_age() {
    let router = test_router_with_config(
        MockDemSource::flat(10_000),
        RouterConfig::new().with_cache_max_age(60).with_tracing(false),
    );

    let response = get(&router, "/tiles/dem_png/12/0/0.png?type=mapbox").await;

    assert_eq!(response.header("cache-control"), Some("public, max-age=60"));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_unknown_layer_returns_404() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/std/12/3637/1612.png?type=slope").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let error = response.json();
    assert_eq!(error["error"], "unknown_layer");
    assert_eq!(error["status"], 404);
    assert!(error["message"].as_str().unwrap().contains("std"));
}

#[tokio::test]
async fn test_missing_transform_returns_400() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/12/3637/1612.png").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "invalid_transform");
}

#[tokio::test]
async fn test_unknown_transform_returns_400() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/12/3637/1612.png?type=aspect").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error = response.json();
    assert_eq!(error["error"], "invalid_transform");
    assert!(error["message"].as_str().unwrap().contains("hillshade"));
}

#[tokio::test]
async fn test_unparsable_number_returns_400() {
    let router = test_router(MockDemSource::flat(10_000));

    for query in ["gain=abc", "low=", "high=1e999", "interval=NaN", "dir=north", "alt=x"] {
        let uri = format!("/tiles/dem_png/12/3637/1612.png?type=hillshade&{}", query);
        let response = get(&router, &uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", query);
        assert_eq!(response.json()["error"], "invalid_parameter", "{}", query);
    }
}

#[tokio::test]
async fn test_malformed_color_is_not_an_error() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(
        &router,
        "/tiles/dem_png/12/3637/1612.png?type=elevation&colors=banana&fallback=zz",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_coordinates_return_400() {
    let router = test_router(MockDemSource::flat(10_000));

    for path in [
        "/tiles/dem_png/z/3637/1612.png",
        "/tiles/dem_png/12/-1/1612.png",
        "/tiles/dem_png/12/3637/1612.jpg",
        "/tiles/dem_png/12/3637/.png",
        "/tiles/dem_png/12/9223372036854775807/0.png",
        "/tiles/dem_png/12/0/4096.png",
        "/tiles/dem_png/31/0/0.png",
        "/tiles/dem_png/4294967295/0/0.png",
    ] {
        let uri = format!("{}?type=slope", path);
        let response = get(&router, &uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(response.json()["error"], "invalid_address", "{}", path);
    }
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/12/3637").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Service Endpoints
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = test_router(MockDemSource::flat(0));

    let response = get(&router, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_layers() {
    let router = test_router(MockDemSource::flat(0));

    let response = get(&router, "/layers").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["upstream"], UPSTREAM);

    let mut layers: Vec<&str> = body["layers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_str().unwrap())
        .collect();
    layers.sort_unstable();
    let mut expected = LAYERS.to_vec();
    expected.sort_unstable();
    assert_eq!(layers, expected);

    assert_eq!(body["transforms"].as_array().unwrap().len(), 6);
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_any_origin() {
    let router = test_router(MockDemSource::flat(0));

    let request = Request::builder()
        .uri("/health")
        .header("origin", "https://maps.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
}

#[tokio::test]
async fn test_cors_restricted_origin() {
    let router = test_router_with_config(
        MockDemSource::flat(0),
        RouterConfig::new()
            .with_cors_origins(vec!["https://maps.example.com".to_string()])
            .with_tracing(false),
    );

    let allowed = Request::builder()
        .uri("/health")
        .header("origin", "https://maps.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, allowed).await;
    assert_eq!(
        response.header("access-control-allow-origin"),
        Some("https://maps.example.com")
    );

    let other = Request::builder()
        .uri("/health")
        .header("origin", "https://elsewhere.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, other).await;
    assert!(response.header("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_tracing_layer_enabled() {
    let router = test_router_with_config(MockDemSource::flat(0), RouterConfig::new());

    let response = get(&router, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
}
