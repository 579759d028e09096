//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude),
//! fractional Web Mercator tile coordinates, and projected pixel space at a
//! continuous zoom level.
//!
//! Two zoom notions are kept apart:
//!
//! - the *fractional* zoom the user sees, which changes smoothly, and
//! - the *base* zoom, the integer pyramid level whose tiles back it.
//!
//! Between two integer levels the tile size grows from `project_size` to
//! `2 * project_size`, so the picture scales continuously while tile
//! selection stays on one discrete level.

mod types;

pub use types::{
    CoordError, GeoCoord, TileCoord, TilePoint, MAX_LAT, MAX_LON, MAX_TILE_ZOOM, MIN_LAT,
    MIN_LON,
};

use std::f64::consts::PI;

/// Pixel size of one tile at an integer zoom level.
pub const DEFAULT_PROJECT_SIZE: f64 = 256.0;

/// Highest pyramid level the default tile server provides.
pub const DEFAULT_TILE_RANGE: u8 = 14;

/// Returns the integer pyramid level backing a fractional zoom.
///
/// This is `floor(zoom)`, saturated to the representable pyramid levels.
/// Negative zooms (a display narrower than one tile) map to level 0.
#[inline]
pub fn base_zoom(zoom: f64) -> u8 {
    if zoom.is_nan() {
        return 0;
    }
    zoom.floor().clamp(0.0, MAX_TILE_ZOOM as f64) as u8
}

/// Returns the on-screen pixel size of a tile at a fractional zoom.
#[inline]
pub fn tile_size_at_zoom(zoom: f64, project_size: f64) -> f64 {
    project_size * 2.0_f64.powf(zoom - base_zoom(zoom) as f64)
}

/// Projects a geographic position to fractional tile coordinates at level `z`.
#[inline]
pub fn geo_to_tile(lon: f64, lat: f64, z: u8) -> TilePoint {
    let n = 2.0_f64.powi(z as i32);

    let x = (lon + 180.0) / 360.0 * n;

    let lat_rad = lat.to_radians();
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    TilePoint { x, y }
}

/// Converts fractional tile coordinates at level `z` back to a geographic position.
///
/// The result is not normalized: `x` outside `[0, 2^z)` yields a longitude
/// outside `[-180, 180)`.
#[inline]
pub fn tile_to_geo(x: f64, y: f64, z: u8) -> GeoCoord {
    let n = 2.0_f64.powi(z as i32);

    let lon = x / n * 360.0 - 180.0;

    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    let lat = lat_rad.to_degrees();

    GeoCoord { lat, lon }
}

/// Clamps latitude into `[-90, 90]` and wraps longitude into `[-180, 180)`.
///
/// NaN components become `0.0`; an infinite latitude lands on the nearest
/// pole and an infinite longitude becomes `0.0`.
pub fn normalize(coord: GeoCoord) -> GeoCoord {
    let lat = if coord.lat.is_nan() {
        0.0
    } else {
        coord.lat.clamp(MIN_LAT, MAX_LAT)
    };

    let lon = if (MIN_LON..MAX_LON).contains(&coord.lon) {
        coord.lon
    } else if coord.lon.is_finite() {
        let mut lon = (coord.lon - MIN_LON).rem_euclid(360.0) + MIN_LON;
        // rem_euclid may round up to the divisor itself
        if lon >= MAX_LON {
            lon -= 360.0;
        }
        lon
    } else {
        0.0
    };

    GeoCoord { lat, lon }
}

/// Zoom-dependent projection settings shared by the viewport and renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Pixel size of a tile at an integer zoom.
    pub project_size: f64,
    /// Highest pyramid level requested from the tile source.
    pub tile_range: u8,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            project_size: DEFAULT_PROJECT_SIZE,
            tile_range: DEFAULT_TILE_RANGE,
        }
    }
}

impl Projection {
    pub fn new(project_size: f64, tile_range: u8) -> Self {
        Self {
            project_size,
            tile_range: tile_range.min(MAX_TILE_ZOOM),
        }
    }

    /// Base zoom capped at the highest level the source provides.
    ///
    /// Beyond `tile_range` the map keeps magnifying the deepest level.
    #[inline]
    pub fn base_zoom(&self, zoom: f64) -> u8 {
        base_zoom(zoom).min(self.tile_range)
    }

    /// Tile pixel size at `zoom`, relative to [`Projection::base_zoom`].
    #[inline]
    pub fn tile_size_at_zoom(&self, zoom: f64) -> f64 {
        self.project_size * 2.0_f64.powf(zoom - self.base_zoom(zoom) as f64)
    }
}
