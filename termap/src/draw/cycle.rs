//! Idle/drawing state machine around a renderer.
//!
//! ```text
//! Idle    --trigger--> Drawing   render, then present
//! Drawing --trigger--> Drawing   DrawError::Busy, redraw marked pending
//! Drawing --finish---> Idle      report whether a redraw is pending,
//!                                on success and on failure alike
//! ```
//!
//! Outstanding draws are never cancelled. A trigger that arrives while one
//! is running is rejected with [`DrawError::Busy`]; the caller learns from
//! the finishing draw's [`DrawReport`] that it should draw again, so view
//! changes made during a draw always reach the screen.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::types::{DrawError, FrameSink, RenderError, Renderer};
use crate::viewport::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawState {
    Idle,
    Drawing,
}

/// Result of a completed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawReport {
    /// A trigger was rejected while this draw ran; draw again.
    pub redraw_pending: bool,
    /// Rows in the presented frame.
    pub rows: usize,
}

#[derive(Debug)]
struct CycleInner {
    state: DrawState,
    redraw_pending: bool,
}

/// Drives one renderer into one sink, one frame at a time.
pub struct DrawCycle {
    renderer: Arc<dyn Renderer>,
    sink: Arc<dyn FrameSink>,
    inner: Mutex<CycleInner>,
    frames: AtomicU64,
    busy: AtomicU64,
}

impl std::fmt::Debug for DrawCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCycle")
            .field("inner", &self.inner)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

/// Returns the cycle to idle when a draw ends, including when the draw
/// future is dropped before completion.
struct DrawingGuard<'a> {
    inner: &'a Mutex<CycleInner>,
}

impl DrawingGuard<'_> {
    /// Leave the drawing state and take the pending flag.
    fn finish(self) -> bool {
        let mut inner = self.inner.lock();
        inner.state = DrawState::Idle;
        std::mem::take(&mut inner.redraw_pending)
    }
}

impl Drop for DrawingGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock().state = DrawState::Idle;
    }
}

impl DrawCycle {
    pub fn new(renderer: Arc<dyn Renderer>, sink: Arc<dyn FrameSink>) -> Self {
        Self {
            renderer,
            sink,
            inner: Mutex::new(CycleInner {
                state: DrawState::Idle,
                redraw_pending: false,
            }),
            frames: AtomicU64::new(0),
            busy: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> DrawState {
        self.inner.lock().state
    }

    /// Whether a rejected trigger is still waiting for a draw.
    pub fn redraw_pending(&self) -> bool {
        self.inner.lock().redraw_pending
    }

    /// Frames presented so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Triggers rejected with [`DrawError::Busy`] so far.
    pub fn busy_rejections(&self) -> u64 {
        self.busy.load(Ordering::Relaxed)
    }

    /// Render `view` and present the frame.
    ///
    /// Returns [`DrawError::Busy`] without side effects other than marking a
    /// redraw pending when another draw is outstanding.
    pub async fn draw(&self, view: ViewState) -> Result<DrawReport, DrawError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == DrawState::Drawing {
                inner.redraw_pending = true;
                self.busy.fetch_add(1, Ordering::Relaxed);
                debug!("Draw rejected: renderer is busy");
                return Err(DrawError::Busy);
            }
            inner.state = DrawState::Drawing;
            inner.redraw_pending = false;
        }
        let guard = DrawingGuard { inner: &self.inner };

        trace!(zoom = view.zoom, center = %view.center, "Drawing frame");

        let drawn = match self.renderer.render(&view).await {
            Ok(frame) => {
                let rows = frame.height();
                self.sink
                    .present(frame)
                    .map(|()| rows)
                    .map_err(FailedStage::Present)
            }
            Err(e) => Err(FailedStage::Render(e)),
        };
        let redraw_pending = guard.finish();

        match drawn {
            Ok(rows) => {
                self.frames.fetch_add(1, Ordering::Relaxed);
                Ok(DrawReport {
                    redraw_pending,
                    rows,
                })
            }
            Err(stage) => {
                let err = stage.into_error(redraw_pending);
                warn!(error = %err, redraw_pending, "Draw failed");
                Err(err)
            }
        }
    }
}

enum FailedStage {
    Render(RenderError),
    Present(io::Error),
}

impl FailedStage {
    fn into_error(self, redraw_pending: bool) -> DrawError {
        match self {
            FailedStage::Render(source) => DrawError::Render {
                source,
                redraw_pending,
            },
            FailedStage::Present(e) => DrawError::Present {
                message: e.to_string(),
                redraw_pending,
            },
        }
    }
}
