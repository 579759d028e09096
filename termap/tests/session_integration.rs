//! Integration tests for a map session.
//!
//! These tests drive the complete flow without a terminal:
//! - input events → viewport controller → draw cycle
//! - renderer → tile cache → tile source
//! - HTTP transport errors surfacing through the cache
//!
//! Run with: `cargo test --test session_integration`

use std::collections::HashSet;
use std::io;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

use termap::app::MapSession;
use termap::cache::{TileCache, TileError};
use termap::config::MapConfig;
use termap::coord::TileCoord;
use termap::draw::{visible_tiles, Frame, FrameSink};
use termap::input::{input_channel, run_input_loop, InputEvent, KeyAction};
use termap::provider::{AsyncHttpClient, HttpTileSource, ProviderError, TileSource};
use termap::tile::RawTileParser;

// ============================================================================
// Helpers
// ============================================================================

/// Source answering every tile with its path, counting requests per tile.
#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
    requested: Mutex<Vec<TileCoord>>,
}

impl TileSource for CountingSource {
    fn fetch_raw(&self, tile: TileCoord) -> BoxFuture<'_, Result<Bytes, ProviderError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(tile);
        async move { Ok(Bytes::from(tile.to_string())) }.boxed()
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[derive(Default)]
struct RecordingSink {
    frames: Mutex<Vec<Frame>>,
}

impl FrameSink for RecordingSink {
    fn present(&self, frame: Frame) -> io::Result<()> {
        self.frames.lock().push(frame);
        Ok(())
    }
}

/// HTTP client serving a fixed status for every URL.
struct StatusClient {
    status: u16,
    reason: &'static str,
    urls: Mutex<Vec<String>>,
}

impl AsyncHttpClient for StatusClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
        _accept: &'a str,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        self.urls.lock().push(url.to_string());
        async move {
            Err(ProviderError::HttpStatus {
                status: self.status,
                reason: self.reason.to_string(),
            })
        }
        .boxed()
    }
}

fn berlin_config() -> MapConfig {
    MapConfig::default()
        .with_initial_zoom(Some(10.0))
        .with_braille(false)
}

// ============================================================================
// Session Flow
// ============================================================================

#[tokio::test]
async fn test_first_draw_fetches_visible_tiles() {
    let source = Arc::new(CountingSource::default());
    let sink = Arc::new(RecordingSink::default());
    let session = MapSession::with_source(berlin_config(), source.clone(), sink.clone()).unwrap();
    let controller = session.controller(100, 41);

    let view = controller.state();
    let expected: HashSet<TileCoord> = visible_tiles(&view).iter().map(|t| t.coord).collect();
    assert!(expected.contains(&TileCoord::new(10, 550, 335)));

    let report = session.draw_cycle().draw(view).await.unwrap();
    assert!(!report.redraw_pending);
    assert_eq!(report.rows, 40);

    let fetched: HashSet<TileCoord> = source.requested.lock().iter().copied().collect();
    assert_eq!(fetched, expected);
    for tile in &expected {
        assert!(session.cache().contains(*tile));
    }

    let frames = sink.frames.lock();
    assert_eq!(frames.len(), 1);
    assert!(frames[0].lines().join("\n").contains("10/550/335"));
}

#[tokio::test]
async fn test_redraw_of_same_view_hits_cache() {
    let source = Arc::new(CountingSource::default());
    let session = MapSession::with_source(
        berlin_config(),
        source.clone(),
        Arc::new(RecordingSink::default()),
    )
    .unwrap();
    let controller = session.controller(100, 41);

    session.draw_cycle().draw(controller.state()).await.unwrap();
    let calls = source.calls.load(Ordering::SeqCst);

    session.draw_cycle().draw(controller.state()).await.unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    assert!(session.cache().stats().hits >= calls as u64);
}

#[tokio::test]
async fn test_input_loop_drives_redraws() {
    let source = Arc::new(CountingSource::default());
    let sink = Arc::new(RecordingSink::default());
    let session = MapSession::with_source(berlin_config(), source.clone(), sink.clone()).unwrap();
    let mut controller = session.controller(100, 41);

    let (tx, mut rx) = input_channel(16);
    for action in [
        KeyAction::PanRight,
        KeyAction::ZoomIn,
        KeyAction::ToggleBraille,
        KeyAction::Quit,
    ] {
        tx.send(InputEvent::Key(action)).await.unwrap();
    }

    let mut views = Vec::new();
    run_input_loop(&mut controller, &mut rx, |controller, outcome| {
        assert!(outcome.needs_redraw());
        views.push(controller.state());
        ControlFlow::Continue(())
    })
    .await;

    assert_eq!(views.len(), 3);
    assert!((views[0].center.lon - (13.42012 + 8.0 / 1024.0)).abs() < 1e-9);
    assert!((views[1].zoom - 10.2).abs() < 1e-12);

    for view in views {
        session.draw_cycle().draw(view).await.unwrap();
    }
    assert_eq!(sink.frames.lock().len(), 3);
    assert_eq!(session.draw_cycle().frames_drawn(), 3);
}

#[tokio::test]
async fn test_panning_far_keeps_cache_bounded() {
    let source = Arc::new(CountingSource::default());
    let config = berlin_config().with_cache_size(16);
    let session =
        MapSession::with_source(config, source.clone(), Arc::new(RecordingSink::default()))
            .unwrap();
    let mut controller = session.controller(100, 41);

    for _ in 0..30 {
        for _ in 0..64 {
            controller.apply(InputEvent::Key(KeyAction::PanRight));
        }
        session.draw_cycle().draw(controller.state()).await.unwrap();
        assert!(session.cache().len() <= 16);
    }

    let stats = session.cache().stats();
    assert!(stats.evictions > 0);
    assert_eq!(stats.entry_count, 16);
}

// ============================================================================
// HTTP Transport
// ============================================================================

#[tokio::test]
async fn test_http_404_is_reported_and_not_cached() {
    let client = StatusClient {
        status: 404,
        reason: "Not Found",
        urls: Mutex::new(Vec::new()),
    };
    let source = Arc::new(HttpTileSource::new(client, "https://tiles.example.com/planet").unwrap());
    let cache = TileCache::new(Arc::new(RawTileParser), 16).with_source(source.clone());

    let tile = TileCoord::new(5, 10, 10);
    assert_eq!(
        source.tile_url(tile),
        "https://tiles.example.com/planet/5/10/10.pbf"
    );
    let err = cache.get_tile(tile).await.unwrap_err();

    assert!(matches!(err, TileError::Provider(_)));
    assert_eq!(err.status(), Some(404));
    assert!(!cache.contains(tile));
    assert!(cache.is_empty());

    // Failures are not cached: the next request goes out again.
    let _ = cache.get_tile(tile).await;
    assert_eq!(cache.stats().misses, 2);
}
