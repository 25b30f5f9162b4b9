//! Rendered output through the HTTP surface.
//!
//! Tests verify:
//! - Pixel values of each transform on synthetic terrain
//! - Kernel transforms are seamless across tile boundaries
//! - Missing upstream tiles render as the fallback color
//! - Color and numeric parameters take effect

use axum::http::StatusCode;
use image::Rgba;

use dem_streamer::tile::TileAddress;

use super::test_utils::{close, get, test_router, MockDemSource};

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const MID_GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

// =============================================================================
// Single-tile Transforms
// =============================================================================

#[tokio::test]
async fn test_mapbox_repacks_elevation() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=mapbox").await;

    // floor(0.1 * 10000 + 100000) = 101000 = 0x018A88
    let image = response.image();
    assert!(image.pixels().all(|p| *p == Rgba([0x01, 0x8A, 0x88, 0xFF])));
}

#[tokio::test]
async fn test_elevation_default_ramp() {
    // 2000 m is halfway up the default 0..4000 m range
    let router = test_router(MockDemSource::flat(200_000));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=elevation").await;

    let pixel = *response.image().get_pixel(100, 100);
    assert!(close(pixel, MID_GRAY, 2), "{:?}", pixel);
}

#[tokio::test]
async fn test_elevation_custom_ramp_and_range() {
    let router = test_router(MockDemSource::flat(200_000));

    let response = get(
        &router,
        "/tiles/dem_png/15/1/1.png?type=elevation&colors=f00-00f&low=0&high=1000",
    )
    .await;

    // 2000 m is above the range and clips to the last stop
    let image = response.image();
    assert!(image.pixels().all(|p| *p == Rgba([0, 0, 255, 255])));
}

#[tokio::test]
async fn test_elevation_gain() {
    let router = test_router(MockDemSource::flat(100_000));

    let plain = get(&router, "/tiles/dem_png/15/1/1.png?type=elevation").await;
    let doubled = get(&router, "/tiles/dem_png/15/1/1.png?type=elevation&gain=2").await;

    let plain = *plain.image().get_pixel(0, 0);
    let doubled = *doubled.image().get_pixel(0, 0);
    assert!(close(plain, Rgba([64, 64, 64, 255]), 2), "{:?}", plain);
    assert!(close(doubled, MID_GRAY, 2), "{:?}", doubled);
}

#[tokio::test]
async fn test_malformed_ramp_uses_default() {
    let router = test_router(MockDemSource::flat(200_000));

    let default = get(&router, "/tiles/dem_png/15/1/1.png?type=elevation").await;
    let malformed = get(&router, "/tiles/dem_png/15/1/1.png?type=elevation&colors=FFF-000").await;

    assert_eq!(malformed.status, StatusCode::OK);
    assert!(!malformed.cache_hit());
    assert_eq!(default.image(), malformed.image());
}

// =============================================================================
// Kernel Transforms
// =============================================================================

#[tokio::test]
async fn test_slope_is_seamless_across_tiles() {
    // At z15 one pixel is 500 cm wide; rising 250 cm per pixel is a 45 degree slope
    let router = test_router(MockDemSource::ramp_east(250));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;

    let image = response.image();
    let first = *image.get_pixel(0, 0);
    assert!(close(first, MID_GRAY, 2), "{:?}", first);
    assert!(image.pixels().all(|p| *p == first));
}

#[tokio::test]
async fn test_slope_scales_with_zoom() {
    // Same terrain one zoom level out: pixels are twice as wide
    let router = test_router(MockDemSource::ramp_east(250));

    let z15 = get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;
    let z14 = get(&router, "/tiles/dem_png/14/1/1.png?type=slope").await;

    // slope is drawn from white (flat) to black (vertical)
    let z15 = z15.image().get_pixel(10, 10)[0];
    let z14 = z14.image().get_pixel(10, 10)[0];
    assert!(z14 > z15, "z14 {} should be flatter than z15 {}", z14, z15);
}

#[tokio::test]
async fn test_flat_slope_is_white() {
    let router = test_router(MockDemSource::flat(123_456));

    let response = get(&router, "/tiles/dem5a_png/15/1/1.png?type=slope").await;

    assert!(response.image().pixels().all(|p| *p == WHITE));
}

#[tokio::test]
async fn test_missing_neighbor_leaves_fallback_edge() {
    let source = MockDemSource::ramp_east(250).with_missing(TileAddress::new(15, 2, 1));
    let router = test_router(source);

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=slope").await;

    assert_eq!(response.status, StatusCode::OK);
    let image = response.image();
    for y in 0..image.height() {
        assert_eq!(*image.get_pixel(255, y), CLEAR, "y = {}", y);
        assert!(close(*image.get_pixel(254, y), MID_GRAY, 2), "y = {}", y);
    }
}

#[tokio::test]
async fn test_missing_tile_renders_fallback() {
    let router = test_router(MockDemSource::flat(10_000));

    for transform in ["elevation", "slope", "curvature", "hillshade", "contour"] {
        let uri = format!(
            "/tiles/empty_png/15/1/1.png?type={}&fallback=ff000080",
            transform
        );
        let response = get(&router, &uri).await;
        assert_eq!(response.status, StatusCode::OK, "{}", transform);
        assert!(
            response
                .image()
                .pixels()
                .all(|p| *p == Rgba([255, 0, 0, 0x80])),
            "{}",
            transform
        );
    }
}

#[tokio::test]
async fn test_curvature_of_plane_is_neutral() {
    let router = test_router(MockDemSource::ramp_east(250));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=curvature").await;

    let image = response.image();
    let first = *image.get_pixel(0, 0);
    assert!(close(first, MID_GRAY, 2), "{:?}", first);
    assert!(image.pixels().all(|p| *p == first));
}

#[tokio::test]
async fn test_flat_hillshade() {
    // The default sun is 45 degrees up, so flat ground is half shaded
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade").await;

    let pixel = *response.image().get_pixel(0, 0);
    assert!(close(pixel, Rgba([0, 0, 0, 128]), 2), "{:?}", pixel);
}

#[tokio::test]
async fn test_hillshade_overhead_sun() {
    let router = test_router(MockDemSource::flat(10_000));

    let response = get(&router, "/tiles/dem_png/15/1/1.png?type=hillshade&alt=90").await;

    assert!(response.image().pixels().all(|p| *p == CLEAR));
}

// =============================================================================
// Contours
// =============================================================================

#[tokio::test]
async fn test_contour_lines_every_interval() {
    // 1 m per pixel eastward; the 100 m line falls between pixels 99 and 100
    let router = test_router(MockDemSource::ramp_east(100));

    let response = get(&router, "/tiles/dem_png/15/0/0.png?type=contour").await;

    let image = response.image();
    assert_eq!(*image.get_pixel(99, 10), WHITE);
    assert_eq!(*image.get_pixel(199, 10), WHITE);
    assert_eq!(*image.get_pixel(50, 10), CLEAR);
    assert_eq!(*image.get_pixel(100, 10), CLEAR);
    assert_eq!(*image.get_pixel(255, 10), CLEAR);
}

#[tokio::test]
async fn test_contour_interval_and_color() {
    let router = test_router(MockDemSource::ramp_east(100));

    let response = get(
        &router,
        "/tiles/dem_png/15/0/0.png?type=contour&interval=50&color=f00",
    )
    .await;

    let image = response.image();
    assert_eq!(*image.get_pixel(49, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*image.get_pixel(99, 0), Rgba([255, 0, 0, 255]));
    assert_eq!(*image.get_pixel(75, 0), CLEAR);
}
