//! Frame drawing.
//!
//! [`DrawCycle`] serializes draws for one display: it asks a [`Renderer`]
//! for a frame of the current [`ViewState`](crate::viewport::ViewState) and
//! hands the result to a [`FrameSink`]. [`TileGridRenderer`] is the built-in
//! renderer; it pulls visible tiles through the tile cache and draws their
//! outlines on a braille [`Canvas`].

mod canvas;
mod cycle;
mod tile_grid;
mod types;

pub use canvas::Canvas;
pub use cycle::{DrawCycle, DrawReport, DrawState};
pub use tile_grid::{visible_tiles, TileGridRenderer, VisibleTile};
pub use types::{DrawError, Frame, FrameSink, RenderError, Renderer};
