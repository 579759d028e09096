//! Coordinate types for geographic and tile-pyramid space.

use std::fmt;

use thiserror::Error;

/// Minimum latitude accepted after normalization.
pub const MIN_LAT: f64 = -90.0;

/// Maximum latitude accepted after normalization.
pub const MAX_LAT: f64 = 90.0;

/// Minimum longitude (inclusive) after normalization.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude (exclusive) after normalization.
pub const MAX_LON: f64 = 180.0;

/// Highest integer pyramid level representable by [`TileCoord`].
pub const MAX_TILE_ZOOM: u8 = 30;

/// Errors raised when constructing tile coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid zoom level: {0} (max {MAX_TILE_ZOOM})")]
    InvalidZoom(u8),

    #[error("Tile row {y} out of range at zoom {z}")]
    RowOutOfRange { z: u8, y: i64 },
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoord {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}, {:.3}", self.lat, self.lon)
    }
}

/// A fractional position in tile space at some integer pyramid level.
///
/// The integer part selects the tile; the fractional part is the offset
/// inside it. Used for all pan and zoom arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePoint {
    pub x: f64,
    pub y: f64,
}

impl TilePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The integer tile containing this point.
    pub fn tile(&self, z: u8) -> Result<TileCoord, CoordError> {
        TileCoord::wrapped(z, self.x.floor() as i64, self.y.floor() as i64)
    }
}

/// Identifies one tile of the pyramid.
///
/// `x` grows eastward and `y` grows southward; both range over `[0, 2^z)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at level `z`.
    #[inline]
    pub fn tiles_per_axis(z: u8) -> i64 {
        1i64 << z.min(MAX_TILE_ZOOM)
    }

    /// Builds a tile coordinate from possibly out-of-range indices.
    ///
    /// Columns wrap around the antimeridian. Rows do not wrap: anything
    /// above the north edge or below the south edge is rejected.
    pub fn wrapped(z: u8, x: i64, y: i64) -> Result<Self, CoordError> {
        if z > MAX_TILE_ZOOM {
            return Err(CoordError::InvalidZoom(z));
        }
        let n = Self::tiles_per_axis(z);
        if !(0..n).contains(&y) {
            return Err(CoordError::RowOutOfRange { z, y });
        }
        Ok(Self {
            z,
            x: x.rem_euclid(n) as u32,
            y: y as u32,
        })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
