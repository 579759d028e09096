//! Session wiring.

use std::sync::Arc;

use tracing::info;

use super::error::AppError;
use crate::cache::TileCache;
use crate::config::MapConfig;
use crate::draw::{DrawCycle, FrameSink, TileGridRenderer};
use crate::provider::{HttpTileSource, ReqwestClient, TileSource};
use crate::tile::{RawTile, RawTileParser};
use crate::viewport::ViewportController;

/// The long-lived components of one map display.
pub struct MapSession {
    config: Arc<MapConfig>,
    cache: Arc<TileCache<RawTile>>,
    renderer: Arc<TileGridRenderer<RawTile>>,
    draw_cycle: Arc<DrawCycle>,
}

impl MapSession {
    /// Start a session fetching tiles over HTTP from `config.source`.
    pub fn start(config: MapConfig, sink: Arc<dyn FrameSink>) -> Result<Self, AppError> {
        config.validate()?;
        let client = ReqwestClient::with_timeout(config.http_timeout_secs)?;
        let source = HttpTileSource::new(client, &config.source)?;
        Self::with_source(config, Arc::new(source), sink)
    }

    /// Start a session on an existing tile source.
    pub fn with_source(
        config: MapConfig,
        source: Arc<dyn TileSource>,
        sink: Arc<dyn FrameSink>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        info!(
            source = source.name(),
            cache_size = config.cache_size,
            braille = config.use_braille,
            "Starting map session"
        );

        let cache = Arc::new(
            TileCache::new(Arc::new(RawTileParser), config.cache_size).with_source(source),
        );
        let renderer = Arc::new(TileGridRenderer::new(
            Arc::clone(&cache),
            config.use_braille,
        ));
        let draw_cycle = Arc::new(DrawCycle::new(renderer.clone(), sink));

        Ok(Self {
            config: Arc::new(config),
            cache,
            renderer,
            draw_cycle,
        })
    }

    pub fn config(&self) -> &Arc<MapConfig> {
        &self.config
    }

    pub fn cache(&self) -> &Arc<TileCache<RawTile>> {
        &self.cache
    }

    pub fn renderer(&self) -> &Arc<TileGridRenderer<RawTile>> {
        &self.renderer
    }

    pub fn draw_cycle(&self) -> &Arc<DrawCycle> {
        &self.draw_cycle
    }

    /// A viewport controller for a terminal of `cols` x `rows` cells.
    pub fn controller(&self, cols: u16, rows: u16) -> ViewportController {
        ViewportController::new(&self.config, cols, rows)
    }

    /// Flip between braille and ASCII output. Returns the new setting.
    pub fn toggle_braille(&self) -> bool {
        let enabled = self.renderer.toggle_braille();
        info!(braille = enabled, "Output mode changed");
        enabled
    }
}
