//! Widgets for the map screen.

mod map;
mod status;

pub use map::MapWidget;
pub use status::StatusLine;
