//! Viewport state and the read-only snapshot handed to renderers.

use crate::coord::{geo_to_tile, normalize, tile_to_geo, GeoCoord, Projection, TilePoint};

/// Mutable view parameters owned by [`super::ViewportController`].
///
/// `min_zoom <= zoom <= max_zoom` holds after every controller operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: GeoCoord,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

/// Snapshot of what to draw: position, zoom and display size in pixels.
///
/// One terminal cell is 2 pixels wide and 4 pixels tall, the dot grid of a
/// braille glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub center: GeoCoord,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub projection: Projection,
}

impl ViewState {
    /// Pyramid level whose tiles back this view.
    pub fn base_zoom(&self) -> u8 {
        self.projection.base_zoom(self.zoom)
    }

    /// On-screen pixel size of one tile.
    pub fn tile_size(&self) -> f64 {
        self.projection.tile_size_at_zoom(self.zoom)
    }

    /// The view center in tile space at [`ViewState::base_zoom`].
    pub fn center_tile(&self) -> TilePoint {
        geo_to_tile(self.center.lon, self.center.lat, self.base_zoom())
    }

    /// Geographic position under a display pixel.
    pub fn pixel_to_geo(&self, px: f64, py: f64) -> GeoCoord {
        let size = self.tile_size();
        let z = self.base_zoom();
        let center = self.center_tile();
        let dx = px - self.width as f64 / 2.0;
        let dy = py - self.height as f64 / 2.0;

        normalize(tile_to_geo(center.x + dx / size, center.y + dy / size, z))
    }

    /// Display pixel of a point in tile space at [`ViewState::base_zoom`].
    ///
    /// Inverse of [`ViewState::pixel_to_geo`] before normalization.
    pub fn tile_to_pixel(&self, point: TilePoint) -> (f64, f64) {
        let size = self.tile_size();
        let center = self.center_tile();
        (
            (point.x - center.x) * size + self.width as f64 / 2.0,
            (point.y - center.y) * size + self.height as f64 / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(zoom: f64) -> ViewState {
        ViewState {
            center: GeoCoord::new(0.0, 0.0),
            zoom,
            width: 200,
            height: 100,
            projection: Projection::default(),
        }
    }

    #[test]
    fn test_display_center_is_view_center() {
        let state = view(3.0);
        let geo = state.pixel_to_geo(100.0, 50.0);
        assert!(geo.lat.abs() < 1e-9);
        assert!(geo.lon.abs() < 1e-9);
    }

    #[test]
    fn test_one_tile_east_of_center() {
        // At zoom 2 one tile spans 90 degrees of longitude.
        let state = view(2.0);
        let geo = state.pixel_to_geo(100.0 + 256.0, 50.0);
        assert!((geo.lon - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_to_pixel_inverts_pixel_to_geo() {
        let state = view(4.5);
        let geo = state.pixel_to_geo(37.0, 81.0);
        let point = geo_to_tile(geo.lon, geo.lat, state.base_zoom());
        let (px, py) = state.tile_to_pixel(point);
        assert!((px - 37.0).abs() < 1e-6);
        assert!((py - 81.0).abs() < 1e-6);
    }
}
