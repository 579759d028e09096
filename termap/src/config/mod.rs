//! Map configuration.
//!
//! [`MapConfig`] is built once at startup (defaults, then the INI file,
//! then command-line overrides) and is never mutated afterwards. Components
//! receive it by reference and copy out the fields they need.
//!
//! # File format
//!
//! ```ini
//! [map]
//! initial_lat = 52.51298
//! initial_lon = 13.42012
//! initial_zoom =
//! max_zoom = 18
//! zoom_step = 0.2
//!
//! [source]
//! url = https://tiles.openfreemap.org/planet/map/
//! timeout_secs = 30
//!
//! [cache]
//! size = 16
//!
//! [display]
//! braille = true
//! tile_range = 14
//! project_size = 256
//!
//! [mouse]
//! click_to_center = true
//! drag = false
//! zoom = false
//! ```

mod file;

pub use file::{config_file_path, ConfigError};

use std::path::PathBuf;

use crate::cache::DEFAULT_CACHE_SIZE;
use crate::coord::{Projection, DEFAULT_PROJECT_SIZE, DEFAULT_TILE_RANGE, MAX_TILE_ZOOM};

/// Default vector tile server.
pub const DEFAULT_SOURCE: &str = "https://tiles.openfreemap.org/planet/map/";

/// Default start position: Berlin.
pub const DEFAULT_INITIAL_LAT: f64 = 52.51298;
pub const DEFAULT_INITIAL_LON: f64 = 13.42012;

pub const DEFAULT_MAX_ZOOM: f64 = 18.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.2;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Which pointer gestures move the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseOptions {
    /// A click centers the map on the point under the pointer.
    pub click_to_center: bool,
    /// Dragging with the primary button pans the map.
    pub drag: bool,
    /// The scroll wheel zooms toward the pointer.
    pub zoom: bool,
}

impl Default for MouseOptions {
    fn default() -> Self {
        Self {
            click_to_center: true,
            drag: false,
            zoom: false,
        }
    }
}

/// Immutable configuration shared by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub initial_lat: f64,
    pub initial_lon: f64,
    /// Start zoom; `None` starts at the minimum zoom for the display width.
    pub initial_zoom: Option<f64>,
    pub max_zoom: f64,
    /// Zoom change per key press or scroll tick.
    pub zoom_step: f64,
    /// Number of parsed tiles kept in memory.
    pub cache_size: usize,
    /// Tile server base URL; tiles resolve to `{source}{z}/{x}/{y}.pbf`.
    pub source: String,
    pub http_timeout_secs: u64,
    /// Highest pyramid level requested from the source.
    pub tile_range: u8,
    /// Tile pixel size at an integer zoom.
    pub project_size: f64,
    pub use_braille: bool,
    pub mouse: MouseOptions,
    /// Fixed map width in terminal columns instead of the terminal width.
    pub width: Option<u16>,
    /// Fixed map height in terminal rows instead of the terminal height.
    pub height: Option<u16>,
    /// Log file; `None` uses `~/.termap/termap.log`.
    pub log_file: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_lat: DEFAULT_INITIAL_LAT,
            initial_lon: DEFAULT_INITIAL_LON,
            initial_zoom: None,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            cache_size: DEFAULT_CACHE_SIZE,
            source: DEFAULT_SOURCE.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            tile_range: DEFAULT_TILE_RANGE,
            project_size: DEFAULT_PROJECT_SIZE,
            use_braille: true,
            mouse: MouseOptions::default(),
            width: None,
            height: None,
            log_file: None,
        }
    }
}

impl MapConfig {
    /// Set the start position.
    pub fn with_initial_position(mut self, lat: f64, lon: f64) -> Self {
        self.initial_lat = lat;
        self.initial_lon = lon;
        self
    }

    /// Set the start zoom.
    pub fn with_initial_zoom(mut self, zoom: Option<f64>) -> Self {
        self.initial_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_zoom_step(mut self, step: f64) -> Self {
        self.zoom_step = step;
        self
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_braille(mut self, enabled: bool) -> Self {
        self.use_braille = enabled;
        self
    }

    pub fn with_mouse(mut self, mouse: MouseOptions) -> Self {
        self.mouse = mouse;
        self
    }

    /// Pin the map to a fixed size in terminal cells.
    pub fn with_size(mut self, width: Option<u16>, height: Option<u16>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    /// Projection settings derived from this config.
    pub fn projection(&self) -> Projection {
        Projection::new(self.project_size, self.tile_range)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.initial_lat) {
            return Err(ConfigError::invalid(
                "map.initial_lat",
                self.initial_lat,
                "must be between -90 and 90",
            ));
        }
        if !self.initial_lon.is_finite() {
            return Err(ConfigError::invalid(
                "map.initial_lon",
                self.initial_lon,
                "must be a finite number",
            ));
        }
        if !self.max_zoom.is_finite() || self.max_zoom < 0.0 {
            return Err(ConfigError::invalid(
                "map.max_zoom",
                self.max_zoom,
                "must be a non-negative number",
            ));
        }
        if let Some(zoom) = self.initial_zoom {
            if !zoom.is_finite() {
                return Err(ConfigError::invalid(
                    "map.initial_zoom",
                    zoom,
                    "must be a finite number",
                ));
            }
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 0.0 {
            return Err(ConfigError::invalid(
                "map.zoom_step",
                self.zoom_step,
                "must be greater than zero",
            ));
        }
        if self.cache_size == 0 {
            return Err(ConfigError::invalid(
                "cache.size",
                self.cache_size,
                "must hold at least one tile",
            ));
        }
        if !(self.source.starts_with("http://") || self.source.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "source.url",
                &self.source,
                "only HTTP/HTTPS tile sources are supported",
            ));
        }
        if self.tile_range > MAX_TILE_ZOOM {
            return Err(ConfigError::invalid(
                "display.tile_range",
                self.tile_range,
                "exceeds the deepest pyramid level",
            ));
        }
        if !self.project_size.is_finite() || self.project_size <= 0.0 {
            return Err(ConfigError::invalid(
                "display.project_size",
                self.project_size,
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
