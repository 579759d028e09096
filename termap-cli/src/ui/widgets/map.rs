//! Map frame widget.
//!
//! Copies the composed frame into the buffer cell by cell, clipped to the
//! area.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

pub struct MapWidget<'a> {
    lines: &'a [String],
    style: Style,
}

impl<'a> MapWidget<'a> {
    pub fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            style: Style::default().fg(Color::Cyan),
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (dy, line) in self.lines.iter().take(area.height as usize).enumerate() {
            let y = area.y + dy as u16;
            for (dx, ch) in line.chars().take(area.width as usize).enumerate() {
                let x = area.x + dx as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(ch).set_style(self.style);
                }
            }
        }
    }
}
