//! Interactive map loop.
//!
//! Runs on a current-thread runtime:
//!
//! - terminal input arrives from the reader thread through the input channel
//!   and is applied to the viewport controller by `run_input_loop`,
//! - every view change publishes the new view and triggers a draw task,
//! - a draw task that finds a redraw pending draws again with the latest
//!   published view, so changes made during a draw always reach the screen.

use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::sync::Arc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use termap::app::MapSession;
use termap::config::MapConfig;
use termap::draw::{DrawCycle, DrawError, DrawReport};
use termap::input::{input_channel, run_input_loop, InputOutcome, DEFAULT_INPUT_BUFFER};
use termap::viewport::{ViewState, ViewportController};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::CliError;
use crate::input::spawn_reader;
use crate::sink::LatestFrame;
use crate::ui::{self, StatusLine};

type Backend = CrosstermBackend<Stdout>;

/// Restores the terminal when dropped.
struct TerminalGuard {
    terminal: Terminal<Backend>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// The terminal plus what is shown on it, shared by the input loop and
/// draw tasks.
struct Screen {
    guard: Mutex<TerminalGuard>,
    frames: Arc<LatestFrame>,
    status: Mutex<StatusLine>,
}

impl Screen {
    fn set_status(&self, status: StatusLine) {
        *self.status.lock() = status;
    }

    fn paint(&self) -> io::Result<()> {
        let lines = self.frames.lines();
        let status = self.status.lock().clone();
        self.guard
            .lock()
            .terminal
            .draw(|f| ui::render(f, &lines, &status))?;
        Ok(())
    }
}

/// The view to draw next and its footer text.
#[derive(Debug, Clone)]
struct Published {
    view: ViewState,
    footer: String,
}

impl Published {
    fn of(controller: &ViewportController) -> Self {
        Self {
            view: controller.state(),
            footer: controller.footer(),
        }
    }
}

/// Draw the latest published view, repeating while redraws are pending.
fn spawn_draw(cycle: Arc<DrawCycle>, views: watch::Receiver<Published>, screen: Arc<Screen>) {
    tokio::spawn(async move {
        loop {
            let published = views.borrow().clone();
            let result = cycle.draw(published.view).await;

            let mut again = false;
            screen.set_status(draw_status(&published.footer, result, || again = true));
            if let Err(e) = screen.paint() {
                warn!(error = %e, "Failed to paint frame");
                return;
            }
            if !again {
                return;
            }
        }
    });
}

/// Run the map until the user quits.
pub async fn run_map(config: MapConfig) -> Result<(), CliError> {
    let frames = Arc::new(LatestFrame::default());
    let session = MapSession::start(config, frames.clone())?;

    let guard = TerminalGuard::enter()?;
    let size = guard.terminal.size()?;
    let mut controller = session.controller(size.width, size.height);

    let screen = Arc::new(Screen {
        guard: Mutex::new(guard),
        frames,
        status: Mutex::new(StatusLine::new(controller.footer())),
    });

    let (input_tx, mut input_rx) = input_channel(DEFAULT_INPUT_BUFFER);
    spawn_reader(input_tx);

    let (views_tx, views_rx) = watch::channel(Published::of(&controller));
    let trigger = || {
        spawn_draw(
            Arc::clone(session.draw_cycle()),
            views_rx.clone(),
            Arc::clone(&screen),
        )
    };

    info!(
        cols = size.width,
        rows = size.height,
        zoom = controller.zoom(),
        "Map started"
    );

    trigger();
    screen.paint()?;

    let mut paint_error = None;
    run_input_loop(&mut controller, &mut input_rx, |controller, outcome| {
        views_tx.send_replace(Published::of(controller));
        match outcome {
            InputOutcome::ToggleBraille => {
                session.toggle_braille();
                trigger();
            }
            InputOutcome::Redraw => trigger(),
            InputOutcome::PointerMoved | InputOutcome::Ignored | InputOutcome::Quit => {}
        }
        screen.set_status(StatusLine::new(controller.footer()));
        match screen.paint() {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                paint_error = Some(e);
                ControlFlow::Break(())
            }
        }
    })
    .await;

    let stats = session.cache().stats();
    info!(%stats, frames = session.draw_cycle().frames_drawn(), "termap exiting");

    match paint_error {
        Some(e) => Err(CliError::Terminal(e)),
        None => Ok(()),
    }
}

/// Status line for a finished draw, re-triggering when a redraw is pending
/// whether or not the draw succeeded.
fn draw_status(
    footer: &str,
    result: Result<DrawReport, DrawError>,
    retrigger: impl FnOnce(),
) -> StatusLine {
    match result {
        Ok(report) => {
            if report.redraw_pending {
                retrigger();
            }
            StatusLine::new(footer)
        }
        Err(DrawError::Busy) => StatusLine::warning(DrawError::Busy.to_string()),
        Err(e) => {
            warn!(error = %e, "Draw failed");
            if e.redraw_pending() {
                retrigger();
            }
            StatusLine::error(e.to_string())
        }
    }
}
