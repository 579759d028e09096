//! Viewport controller.
//!
//! Holds the map center and fractional zoom together with the display size,
//! and turns user input into pan and zoom operations:
//!
//! - keyboard pans scale with `1 / 2^zoom` so one key press covers the same
//!   screen distance at every zoom level,
//! - scroll zoom keeps the geographic point under the pointer in place,
//! - dragging moves the map with the pointer.
//!
//! Renderers never see the controller itself, only [`ViewState`] snapshots.

mod controller;
mod state;

pub use controller::{ViewportController, REFERENCE_SPAN, RESERVED_ROWS};
pub use state::{ViewState, Viewport};
