//! Frame sink shared between draw tasks and the paint loop.

use std::io;

use parking_lot::Mutex;
use termap::draw::{Frame, FrameSink};

/// Keeps only the most recent frame.
#[derive(Debug, Default)]
pub struct LatestFrame {
    lines: Mutex<Vec<String>>,
}

impl LatestFrame {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl FrameSink for LatestFrame {
    fn present(&self, frame: Frame) -> io::Result<()> {
        *self.lines.lock() = frame.into_lines();
        Ok(())
    }
}
