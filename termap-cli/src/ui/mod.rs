//! Terminal UI for termap.
//!
//! The screen is the map frame with one status line below it.

pub mod widgets;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

pub use widgets::{MapWidget, StatusLine};

/// Draw the map and status line into the full terminal area.
pub fn render(frame: &mut Frame, map_lines: &[String], status: &StatusLine) {
    let [map_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    frame.render_widget(MapWidget::new(map_lines), map_area);
    frame.render_widget(status, status_area);
}
