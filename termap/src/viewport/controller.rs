//! Pan and zoom state machine.

use tracing::{debug, trace};

use super::state::{ViewState, Viewport};
use crate::config::{MapConfig, MouseOptions, DEFAULT_MAX_ZOOM};
use crate::coord::{geo_to_tile, normalize, tile_to_geo, GeoCoord, Projection, TilePoint};
use crate::input::{InputEvent, InputOutcome, KeyAction};

/// Display width in pixels at which the whole world fits at zoom 4.
pub const REFERENCE_SPAN: f64 = 4096.0;

/// Terminal rows kept free for the status line.
pub const RESERVED_ROWS: u16 = 1;

/// Longitude degrees panned per key press at zoom 0.
const KEY_PAN_LON: f64 = 8.0;

/// Latitude degrees panned per key press at zoom 0.
const KEY_PAN_LAT: f64 = 6.0;

/// Where an active drag started.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragStart {
    col: u16,
    row: u16,
    /// View center in tile space when the drag began.
    center: TilePoint,
    z: u8,
}

/// Owns the [`Viewport`] and the display size, and applies user input to them.
#[derive(Debug, Clone)]
pub struct ViewportController {
    viewport: Viewport,
    projection: Projection,
    zoom_step: f64,
    mouse: MouseOptions,
    fixed_width: Option<u16>,
    fixed_height: Option<u16>,
    /// Map area in terminal cells.
    cols: u16,
    rows: u16,
    drag: Option<DragStart>,
    /// Set when a drag moved the map; swallows the click that ends it.
    suppress_click: bool,
    pointer: Option<GeoCoord>,
}

impl ViewportController {
    /// Create a controller for a terminal of `cols` x `rows` cells.
    ///
    /// Without a configured initial zoom the view starts at the minimum zoom
    /// for the display width.
    pub fn new(config: &MapConfig, cols: u16, rows: u16) -> Self {
        let max_zoom = if config.max_zoom.is_finite() && config.max_zoom >= 0.0 {
            config.max_zoom
        } else {
            DEFAULT_MAX_ZOOM
        };

        let mut controller = Self {
            viewport: Viewport {
                center: GeoCoord::new(0.0, 0.0),
                zoom: 0.0,
                min_zoom: 0.0,
                max_zoom,
            },
            projection: config.projection(),
            zoom_step: config.zoom_step,
            mouse: config.mouse,
            fixed_width: config.width,
            fixed_height: config.height,
            cols: 0,
            rows: 0,
            drag: None,
            suppress_click: false,
            pointer: None,
        };

        controller.set_center(config.initial_lat, config.initial_lon);
        controller.resize(cols, rows);

        let zoom = config
            .initial_zoom
            .filter(|z| z.is_finite())
            .unwrap_or(controller.viewport.min_zoom);
        controller.viewport.zoom = zoom.clamp(controller.viewport.min_zoom, max_zoom);

        debug!(
            center = %controller.viewport.center,
            zoom = controller.viewport.zoom,
            min_zoom = controller.viewport.min_zoom,
            "Viewport initialized"
        );
        controller
    }

    /// Current viewport parameters.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn center(&self) -> GeoCoord {
        self.viewport.center
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    /// Display width in pixels.
    pub fn width(&self) -> u32 {
        self.cols as u32 * 2
    }

    /// Display height in pixels.
    pub fn height(&self) -> u32 {
        self.rows as u32 * 4
    }

    /// Read-only snapshot for rendering.
    pub fn state(&self) -> ViewState {
        ViewState {
            center: self.viewport.center,
            zoom: self.viewport.zoom,
            width: self.width(),
            height: self.height(),
            projection: self.projection,
        }
    }

    /// Change zoom by `delta`, saturating at the zoom bounds.
    pub fn zoom_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            trace!(delta, "Ignoring non-finite zoom delta");
            return;
        }
        let vp = &mut self.viewport;
        vp.zoom = (vp.zoom + delta).clamp(vp.min_zoom, vp.max_zoom);
    }

    /// Shift the center by the given number of degrees.
    pub fn move_by(&mut self, d_lat: f64, d_lon: f64) {
        let center = self.viewport.center;
        self.set_center(center.lat + d_lat, center.lon + d_lon);
    }

    /// Move the center, normalizing into the valid range.
    ///
    /// A non-finite component leaves that component unchanged.
    pub fn set_center(&mut self, lat: f64, lon: f64) {
        let current = self.viewport.center;
        let lat = if lat.is_finite() { lat } else { current.lat };
        let lon = if lon.is_finite() { lon } else { current.lon };
        self.viewport.center = normalize(GeoCoord::new(lat, lon));
    }

    /// Recompute the display size and minimum zoom for a new terminal size.
    ///
    /// Fixed sizes from the configuration win over the terminal size.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = self.fixed_width.unwrap_or(cols).max(1);
        self.rows = self
            .fixed_height
            .unwrap_or_else(|| rows.saturating_sub(RESERVED_ROWS))
            .max(1);

        let vp = &mut self.viewport;
        let width = self.cols as f64 * 2.0;
        vp.min_zoom = (4.0 - (REFERENCE_SPAN / width).log2()).min(vp.max_zoom);
        vp.zoom = vp.zoom.clamp(vp.min_zoom, vp.max_zoom);

        debug!(
            cols = self.cols,
            rows = self.rows,
            min_zoom = vp.min_zoom,
            "Viewport resized"
        );
    }

    /// Geographic position under a display pixel.
    pub fn pixel_to_geo(&self, px: f64, py: f64) -> GeoCoord {
        self.state().pixel_to_geo(px, py)
    }

    /// Display pixel at the middle of a terminal cell.
    pub fn cell_to_pixel(col: u16, row: u16) -> (f64, f64) {
        ((col as f64 - 0.5) * 2.0, (row as f64 - 0.5) * 4.0)
    }

    /// Zoom by `delta` keeping the point under pixel `(px, py)` in place.
    pub fn zoom_at(&mut self, px: f64, py: f64, delta: f64) {
        if !(px.is_finite() && py.is_finite() && delta.is_finite()) {
            return;
        }

        let target = self.pixel_to_geo(px, py);
        self.zoom_by(delta);
        let offset = self.pixel_to_geo(px, py);

        let z = self.projection.base_zoom(self.viewport.zoom);
        let target_tile = geo_to_tile(target.lon, target.lat, z);
        let offset_tile = geo_to_tile(offset.lon, offset.lat, z);
        let center = self.viewport.center;
        let center_tile = geo_to_tile(center.lon, center.lat, z);

        let anchored = tile_to_geo(
            center_tile.x - (offset_tile.x - target_tile.x),
            center_tile.y - (offset_tile.y - target_tile.y),
            z,
        );
        self.set_center(anchored.lat, anchored.lon);
    }

    /// Start a drag at a cell. No-op unless dragging is enabled.
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        if !self.mouse.drag {
            return;
        }
        let z = self.projection.base_zoom(self.viewport.zoom);
        let center = self.viewport.center;
        self.drag = Some(DragStart {
            col,
            row,
            center: geo_to_tile(center.lon, center.lat, z),
            z,
        });
        self.suppress_click = false;
    }

    /// Continue an active drag. Returns whether the center moved.
    pub fn drag_to(&mut self, col: u16, row: u16) -> bool {
        let Some(start) = self.drag else {
            return false;
        };

        let dx = (start.col as f64 - col as f64) * 2.0;
        let dy = (start.row as f64 - row as f64) * 4.0;
        let size = self.projection.tile_size_at_zoom(self.viewport.zoom);

        let center = tile_to_geo(start.center.x + dx / size, start.center.y + dy / size, start.z);
        self.set_center(center.lat, center.lon);

        if (col, row) != (start.col, start.row) {
            self.suppress_click = true;
        }
        true
    }

    /// Finish a drag. Returns whether the drag moved the map.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some() && self.suppress_click
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Center the map on the cell under a click.
    ///
    /// Returns whether the center changed. Clicks outside the map area, with
    /// click-to-center disabled, or ending a drag are ignored.
    pub fn click(&mut self, col: u16, row: u16) -> bool {
        if std::mem::take(&mut self.suppress_click) {
            return false;
        }
        if !self.mouse.click_to_center || !self.in_map(col, row) {
            return false;
        }
        let (px, py) = Self::cell_to_pixel(col, row);
        let target = self.pixel_to_geo(px, py);
        self.pointer = Some(target);
        self.set_center(target.lat, target.lon);
        true
    }

    /// Geographic position last seen under the pointer.
    pub fn pointer(&self) -> Option<GeoCoord> {
        self.pointer
    }

    /// Status line text.
    pub fn footer(&self) -> String {
        let center = self.viewport.center;
        let mut footer = format!(
            "center: {:.3}, {:.3}   zoom: {:.2}",
            center.lat, center.lon, self.viewport.zoom
        );
        if let Some(pointer) = self.pointer {
            footer.push_str(&format!("   mouse: {:.3}, {:.3}", pointer.lat, pointer.lon));
        }
        footer
    }

    /// Apply one input event.
    pub fn apply(&mut self, event: InputEvent) -> InputOutcome {
        trace!(?event, "Input event");
        match event {
            InputEvent::Key(action) => self.apply_key(action),
            InputEvent::Scroll { col, row, zoom_in } => {
                if !self.mouse.zoom || !self.in_map(col, row) {
                    return InputOutcome::Ignored;
                }
                let (px, py) = Self::cell_to_pixel(col, row);
                let step = if zoom_in {
                    self.zoom_step
                } else {
                    -self.zoom_step
                };
                self.zoom_at(px, py, step);
                self.pointer = Some(self.pixel_to_geo(px, py));
                InputOutcome::Redraw
            }
            InputEvent::MouseDown { col, row } => {
                self.begin_drag(col, row);
                InputOutcome::Ignored
            }
            InputEvent::MouseMove { col, row } => {
                if !self.in_map(col, row) {
                    return InputOutcome::Ignored;
                }
                let moved = self.drag_to(col, row);
                let (px, py) = Self::cell_to_pixel(col, row);
                self.pointer = Some(self.pixel_to_geo(px, py));
                if moved {
                    InputOutcome::Redraw
                } else {
                    InputOutcome::PointerMoved
                }
            }
            InputEvent::MouseUp { .. } => {
                self.end_drag();
                InputOutcome::Ignored
            }
            InputEvent::Click { col, row } => {
                if self.click(col, row) {
                    InputOutcome::Redraw
                } else {
                    InputOutcome::Ignored
                }
            }
            InputEvent::Resize { cols, rows } => {
                self.resize(cols, rows);
                InputOutcome::Redraw
            }
        }
    }

    fn apply_key(&mut self, action: KeyAction) -> InputOutcome {
        let scale = 2.0_f64.powf(self.viewport.zoom);
        match action {
            KeyAction::ZoomIn => self.zoom_by(self.zoom_step),
            KeyAction::ZoomOut => self.zoom_by(-self.zoom_step),
            KeyAction::PanLeft => self.move_by(0.0, -KEY_PAN_LON / scale),
            KeyAction::PanRight => self.move_by(0.0, KEY_PAN_LON / scale),
            KeyAction::PanUp => self.move_by(KEY_PAN_LAT / scale, 0.0),
            KeyAction::PanDown => self.move_by(-KEY_PAN_LAT / scale, 0.0),
            KeyAction::ToggleBraille => return InputOutcome::ToggleBraille,
            KeyAction::Quit => return InputOutcome::Quit,
        }
        InputOutcome::Redraw
    }

    fn in_map(&self, col: u16, row: u16) -> bool {
        col <= self.cols && row <= self.rows
    }
}
