//! Renderer that draws the tile grid behind a view.
//!
//! Every visible tile is pulled through the [`TileCache`], so drawing a view
//! warms the cache exactly the way a full vector renderer would. The frame
//! shows tile borders and a `z/x/y` label per tile with its load status.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::debug;

use super::canvas::Canvas;
use super::types::{Frame, RenderError, Renderer};
use crate::cache::{TileCache, TileError};
use crate::coord::{TileCoord, TilePoint};
use crate::viewport::ViewState;

/// A tile intersecting the view and where its top-left corner lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    /// Display pixel of the tile's top-left corner.
    pub x: f64,
    pub y: f64,
    /// Edge length in display pixels.
    pub size: f64,
}

/// Tiles covering a view, row by row from the top-left.
///
/// Columns repeat across the antimeridian when the world is narrower than
/// the display; rows beyond the poles are skipped.
pub fn visible_tiles(view: &ViewState) -> Vec<VisibleTile> {
    let z = view.base_zoom();
    let size = view.tile_size();
    let center = view.center_tile();

    let half_w = view.width as f64 / 2.0 / size;
    let half_h = view.height as f64 / 2.0 / size;

    // A tile starting exactly on the far edge is not visible.
    let min_x = (center.x - half_w).floor() as i64;
    let max_x = (center.x + half_w).ceil() as i64 - 1;
    let min_y = (center.y - half_h).floor() as i64;
    let max_y = (center.y + half_h).ceil() as i64 - 1;

    let mut tiles = Vec::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let Ok(coord) = TileCoord::wrapped(z, x, y) else {
                continue;
            };
            let (px, py) = view.tile_to_pixel(TilePoint::new(x as f64, y as f64));
            tiles.push(VisibleTile {
                coord,
                x: px,
                y: py,
                size,
            });
        }
    }
    tiles
}

/// Draws the tile grid for a view, fetching every visible tile.
pub struct TileGridRenderer<T> {
    cache: Arc<TileCache<T>>,
    braille: AtomicBool,
}

impl<T> TileGridRenderer<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(cache: Arc<TileCache<T>>, use_braille: bool) -> Self {
        Self {
            cache,
            braille: AtomicBool::new(use_braille),
        }
    }

    pub fn cache(&self) -> &Arc<TileCache<T>> {
        &self.cache
    }

    pub fn use_braille(&self) -> bool {
        self.braille.load(Ordering::Relaxed)
    }

    pub fn set_braille(&self, enabled: bool) {
        self.braille.store(enabled, Ordering::Relaxed);
    }

    /// Flip between braille and ASCII output. Returns the new setting.
    pub fn toggle_braille(&self) -> bool {
        !self.braille.fetch_xor(true, Ordering::Relaxed)
    }

    async fn compose(&self, view: ViewState) -> Result<Frame, RenderError> {
        if view.width == 0 || view.height == 0 {
            return Err(RenderError::InvalidView(format!(
                "{}x{} pixels",
                view.width, view.height
            )));
        }

        let tiles = visible_tiles(&view);
        let results = join_all(tiles.iter().map(|t| self.cache.get_tile(t.coord))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        debug!(
            tiles = tiles.len(),
            failed,
            zoom = view.zoom,
            "Composed tile grid"
        );

        let mut canvas = Canvas::new(view.width, view.height);
        for (tile, result) in tiles.iter().zip(&results) {
            let left = tile.x.round() as i64;
            let top = tile.y.round() as i64;
            let right = (tile.x + tile.size).round() as i64;
            let bottom = (tile.y + tile.size).round() as i64;

            canvas.line(left, top, right, top);
            canvas.line(left, top, left, bottom);

            // Label the visible part of tiles cut off at the top or left.
            let col = left.max(0) / 2 + 2;
            let row = top.max(0) / 4 + 1;
            canvas.text(col, row, &tile.coord.to_string());
            canvas.text(col, row + 1, &status_label(result));
        }

        Ok(Frame::new(canvas.to_lines(self.use_braille())))
    }
}

fn status_label<T>(result: &Result<Arc<T>, TileError>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(e) => match e.status() {
            Some(status) => format!("error {}", status),
            None => "error".to_string(),
        },
    }
}

impl<T> Renderer for TileGridRenderer<T>
where
    T: Send + Sync + 'static,
{
    fn render(&self, view: &ViewState) -> BoxFuture<'_, Result<Frame, RenderError>> {
        self.compose(*view).boxed()
    }
}
