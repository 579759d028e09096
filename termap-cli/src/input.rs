//! Terminal event translation.
//!
//! crossterm events are read on a dedicated thread and forwarded as
//! [`InputEvent`]s, so the async side never blocks on the terminal.

use std::thread;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use termap::input::{InputEvent, InputSender, KeyAction};
use tracing::{debug, warn};

/// Translate one terminal event. A left-button release also yields a click.
pub fn translate(event: Event) -> Vec<InputEvent> {
    match event {
        Event::Key(key) => translate_key(key).map(InputEvent::Key).into_iter().collect(),
        Event::Mouse(mouse) => translate_mouse(mouse),
        Event::Resize(cols, rows) => vec![InputEvent::Resize { cols, rows }],
        _ => Vec::new(),
    }
}

fn translate_key(key: KeyEvent) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'c' => Some(KeyAction::Quit),
            '+' | '=' => Some(KeyAction::ZoomIn),
            '-' => Some(KeyAction::ZoomOut),
            _ => KeyAction::from_char(c),
        },
        KeyCode::Char(c) => KeyAction::from_char(c),
        KeyCode::Left => Some(KeyAction::PanLeft),
        KeyCode::Right => Some(KeyAction::PanRight),
        KeyCode::Up => Some(KeyAction::PanUp),
        KeyCode::Down => Some(KeyAction::PanDown),
        _ => None,
    }
}

fn translate_mouse(mouse: MouseEvent) -> Vec<InputEvent> {
    let (col, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => vec![InputEvent::MouseDown { col, row }],
        MouseEventKind::Up(MouseButton::Left) => vec![
            InputEvent::MouseUp { col, row },
            InputEvent::Click { col, row },
        ],
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            vec![InputEvent::MouseMove { col, row }]
        }
        MouseEventKind::ScrollUp => vec![InputEvent::Scroll {
            col,
            row,
            zoom_in: true,
        }],
        MouseEventKind::ScrollDown => vec![InputEvent::Scroll {
            col,
            row,
            zoom_in: false,
        }],
        _ => Vec::new(),
    }
}

/// Spawn the terminal reader thread.
///
/// The thread exits when the receiving side is dropped or reading fails.
pub fn spawn_reader(tx: InputSender) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Terminal input failed");
                return;
            }
        };
        for input in translate(event) {
            if tx.blocking_send(input).is_err() {
                debug!("Input channel closed, stopping reader");
                return;
            }
        }
    })
}
