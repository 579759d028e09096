//! Frame, renderer and sink abstractions.

use std::io;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::cache::TileError;
use crate::viewport::ViewState;

/// A composed map image: one string per terminal row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Width of the widest row in characters.
    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Errors a renderer may fail a frame with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Invalid view: {0}")]
    InvalidView(String),

    #[error("Tile unavailable: {0}")]
    Tile(#[from] TileError),
}

/// Errors from [`super::DrawCycle::draw`].
///
/// A failed draw still reports whether a trigger was rejected while it
/// ran, so the caller can draw again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrawError {
    /// A draw is already outstanding. Skip this frame; a redraw is pending.
    #[error("renderer is busy")]
    Busy,

    #[error("Render failed: {source}")]
    Render {
        source: RenderError,
        redraw_pending: bool,
    },

    #[error("Failed to present frame: {message}")]
    Present {
        message: String,
        redraw_pending: bool,
    },
}

impl DrawError {
    /// Busy is a skip-this-frame signal, not a failure.
    pub fn is_busy(&self) -> bool {
        matches!(self, DrawError::Busy)
    }

    /// Whether a trigger was rejected during the failed draw.
    ///
    /// Always false for [`DrawError::Busy`]; the outstanding draw reports it.
    pub fn redraw_pending(&self) -> bool {
        match self {
            DrawError::Busy => false,
            DrawError::Render { redraw_pending, .. }
            | DrawError::Present { redraw_pending, .. } => *redraw_pending,
        }
    }
}

/// Composes a frame for a view.
///
/// Renderers only read the snapshot; they never mutate viewport state.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &ViewState) -> BoxFuture<'_, Result<Frame, RenderError>>;
}

/// Receives finished frames, typically the terminal.
pub trait FrameSink: Send + Sync {
    fn present(&self, frame: Frame) -> io::Result<()>;
}
