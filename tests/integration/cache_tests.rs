//! Cache effectiveness integration tests.
//!
//! Tests verify:
//! - Rendered tiles are served from the output cache
//! - Source tiles are fetched once and shared between transforms and
//!   neighboring requests
//! - Concurrent requests do not duplicate upstream fetches

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::StatusCode;

use super::test_utils::{get, test_router, MockDemSource};

// =============================================================================
// Output Cache
// =============================================================================

#[tokio::test]
async fn test_repeat_request_is_cache_hit() {
    let source = MockDemSource::ramp_east(250);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    let first = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade").await;
    assert_eq!(first.status, StatusCode::OK);
    assert!(!first.cache_hit());
    assert_eq!(fetches.load(Ordering::SeqCst), 9);

    let second = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade").await;
    assert!(second.cache_hit());
    assert_eq!(first.body, second.body);
    assert_eq!(fetches.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_extension_does_not_split_cache() {
    let router = test_router(MockDemSource::flat(10_000));

    let with_ext = get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;
    let without_ext = get(&router, "/tiles/dem_png/15/1/1?type=slope").await;

    assert!(!with_ext.cache_hit());
    assert!(without_ext.cache_hit());
}

#[tokio::test]
async fn test_parameters_are_part_of_cache_key() {
    let router = test_router(MockDemSource::flat(10_000));

    let plain = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade").await;
    let lit = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade&dir=315").await;
    let plain_again = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade").await;

    assert!(!plain.cache_hit());
    assert!(!lit.cache_hit());
    assert!(plain_again.cache_hit());
}

#[tokio::test]
async fn test_transform_is_part_of_cache_key() {
    let router = test_router(MockDemSource::flat(10_000));

    let slope = get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;
    let curvature = get(&router, "/tiles/dem_png/15/1/1.png?type=curvature").await;

    assert!(!slope.cache_hit());
    assert!(!curvature.cache_hit());
    assert_ne!(slope.body, curvature.body);
}

// =============================================================================
// Source Tile Cache
// =============================================================================

#[tokio::test]
async fn test_single_tile_transforms_fetch_one_tile() {
    let source = MockDemSource::flat(10_000);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    get(&router, "/tiles/dem_png/15/1/1.png?type=mapbox").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    get(&router, "/tiles/dem_png/15/1/1.png?type=elevation").await;
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transforms_share_source_tiles() {
    let source = MockDemSource::flat(10_000);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    for transform in ["slope", "curvature", "hillshade", "contour", "elevation"] {
        let uri = format!("/tiles/dem_png/15/1/1.png?type={}", transform);
        get(&router, &uri).await;
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_layers_do_not_share_source_tiles() {
    let source = MockDemSource::flat(10_000);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    get(&router, "/tiles/dem_png/15/1/1.png?type=mapbox").await;
    get(&router, "/tiles/dem5a_png/15/1/1.png?type=mapbox").await;

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_fetches_are_retained() {
    let source = MockDemSource::flat(10_000);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    get(&router, "/tiles/empty_png/15/1/1.png?type=slope").await;
    get(&router, "/tiles/empty_png/15/1/1.png?type=curvature").await;

    assert_eq!(fetches.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_adjacent_tiles_share_neighbors() {
    let source = MockDemSource::flat(10_000);
    let fetches = source.fetch_counter();
    let router = test_router(source);

    get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;
    get(&router, "/tiles/dem_png/15/2/1.png?type=slope").await;

    // the second neighborhood adds one new column of three tiles
    assert_eq!(fetches.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn test_concurrent_requests_coalesce_fetches() {
    let source = MockDemSource::flat(10_000).with_delay(Duration::from_millis(20));
    let fetches = source.fetch_counter();
    let router = test_router(source);

    // a 2x2 block of tiles whose neighborhoods cover a 4x4 block
    let mut handles = Vec::new();
    for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let uri = format!("/tiles/dem_png/15/{}/{}.png?type=slope", x, y);
            get(&router, &uri).await.status
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 16);
}
