//! Display-agnostic input events.
//!
//! The terminal front end translates raw key and mouse events into
//! [`InputEvent`]s and sends them through a channel; the
//! [`ViewportController`] consumes them without knowing where they came from.

use std::ops::ControlFlow;

use tokio::sync::mpsc;
use tracing::debug;

use crate::viewport::ViewportController;

/// Default capacity of the input channel.
pub const DEFAULT_INPUT_BUFFER: usize = 64;

/// A keyboard command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ZoomIn,
    ZoomOut,
    PanLeft,
    PanRight,
    PanUp,
    PanDown,
    ToggleBraille,
    Quit,
}

impl KeyAction {
    /// Map a typed character to its action.
    ///
    /// `y` and `z` both zoom out so the binding works on QWERTY and QWERTZ
    /// layouts.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(KeyAction::ZoomIn),
            'z' | 'y' => Some(KeyAction::ZoomOut),
            'h' => Some(KeyAction::PanLeft),
            'l' => Some(KeyAction::PanRight),
            'k' => Some(KeyAction::PanUp),
            'j' => Some(KeyAction::PanDown),
            'c' => Some(KeyAction::ToggleBraille),
            'q' => Some(KeyAction::Quit),
            _ => None,
        }
    }
}

/// User input in terminal cell coordinates (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyAction),
    Scroll { col: u16, row: u16, zoom_in: bool },
    MouseDown { col: u16, row: u16 },
    MouseMove { col: u16, row: u16 },
    MouseUp { col: u16, row: u16 },
    Click { col: u16, row: u16 },
    Resize { cols: u16, rows: u16 },
}

/// What the caller should do after an event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing changed.
    Ignored,
    /// The view changed; draw a new frame.
    Redraw,
    /// Only the pointer position changed; refresh the status line.
    PointerMoved,
    /// Switch between braille and ASCII output, then redraw.
    ToggleBraille,
    Quit,
}

impl InputOutcome {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, InputOutcome::Redraw | InputOutcome::ToggleBraille)
    }
}

pub type InputSender = mpsc::Sender<InputEvent>;
pub type InputReceiver = mpsc::Receiver<InputEvent>;

/// Create a bounded input channel.
pub fn input_channel(buffer: usize) -> (InputSender, InputReceiver) {
    mpsc::channel(buffer.max(1))
}

/// Wait for the next event that changes something and apply it.
///
/// Returns `None` once every sender has been dropped.
pub async fn next_outcome(
    controller: &mut ViewportController,
    events: &mut InputReceiver,
) -> Option<InputOutcome> {
    while let Some(event) = events.recv().await {
        let outcome = controller.apply(event);
        if outcome != InputOutcome::Ignored {
            return Some(outcome);
        }
    }
    None
}

/// Apply events until `Quit`, the channel closes, or `on_outcome` breaks.
pub async fn run_input_loop<F>(
    controller: &mut ViewportController,
    events: &mut InputReceiver,
    mut on_outcome: F,
) where
    F: FnMut(&ViewportController, InputOutcome) -> ControlFlow<()>,
{
    while let Some(outcome) = next_outcome(controller, events).await {
        if outcome == InputOutcome::Quit {
            debug!("Quit requested");
            break;
        }
        if on_outcome(controller, outcome).is_break() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyAction::from_char('a'), Some(KeyAction::ZoomIn));
        assert_eq!(KeyAction::from_char('z'), Some(KeyAction::ZoomOut));
        assert_eq!(KeyAction::from_char('y'), Some(KeyAction::ZoomOut));
        assert_eq!(KeyAction::from_char('h'), Some(KeyAction::PanLeft));
        assert_eq!(KeyAction::from_char('j'), Some(KeyAction::PanDown));
        assert_eq!(KeyAction::from_char('k'), Some(KeyAction::PanUp));
        assert_eq!(KeyAction::from_char('l'), Some(KeyAction::PanRight));
        assert_eq!(KeyAction::from_char('C'), Some(KeyAction::ToggleBraille));
        assert_eq!(KeyAction::from_char('q'), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_char('x'), None);
    }

    #[test]
    fn test_needs_redraw() {
        assert!(InputOutcome::Redraw.needs_redraw());
        assert!(InputOutcome::ToggleBraille.needs_redraw());
        assert!(!InputOutcome::PointerMoved.needs_redraw());
        assert!(!InputOutcome::Quit.needs_redraw());
    }

    #[tokio::test]
    async fn test_next_outcome_skips_ignored_events() {
        let config = MapConfig::default().with_initial_zoom(Some(5.0));
        let mut controller = ViewportController::new(&config, 100, 40);
        let (tx, mut rx) = input_channel(8);

        // Drag is disabled by default, so the press is ignored.
        tx.send(InputEvent::MouseDown { col: 1, row: 1 }).await.unwrap();
        tx.send(InputEvent::Key(KeyAction::ZoomIn)).await.unwrap();
        drop(tx);

        let outcome = next_outcome(&mut controller, &mut rx).await;
        assert_eq!(outcome, Some(InputOutcome::Redraw));
        assert!((controller.zoom() - 5.2).abs() < 1e-12);

        assert_eq!(next_outcome(&mut controller, &mut rx).await, None);
    }

    #[tokio::test]
    async fn test_run_input_loop_stops_on_quit() {
        let config = MapConfig::default().with_initial_zoom(Some(5.0));
        let mut controller = ViewportController::new(&config, 100, 40);
        let (tx, mut rx) = input_channel(8);

        for action in [KeyAction::ZoomIn, KeyAction::PanLeft, KeyAction::Quit, KeyAction::ZoomIn] {
            tx.send(InputEvent::Key(action)).await.unwrap();
        }

        let mut redraws = 0;
        run_input_loop(&mut controller, &mut rx, |_, outcome| {
            assert!(outcome.needs_redraw());
            redraws += 1;
            ControlFlow::Continue(())
        })
        .await;

        assert_eq!(redraws, 2);
        assert!((controller.zoom() - 5.2).abs() < 1e-12);
    }
}
