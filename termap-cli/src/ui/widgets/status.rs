//! Status line widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Normal,
    Warning,
    Error,
}

impl StatusTone {
    fn color(&self) -> Color {
        match self {
            StatusTone::Normal => Color::White,
            StatusTone::Warning => Color::Yellow,
            StatusTone::Error => Color::Red,
        }
    }
}

/// One line of text below the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
    tone: StatusTone,
}

impl StatusLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Normal,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Warning,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Error,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> StatusTone {
        self.tone
    }
}

impl Widget for &StatusLine {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(Span::styled(
            self.text.as_str(),
            Style::default().fg(self.tone().color()),
        ));
        Paragraph::new(line).render(area, buf);
    }
}
