//! Terminal UI (spec §4.F): a non-blocking ~10ms poll loop over
//! `ratatui` + `crossterm`, rendering the active context's live result
//! store and dispatching key presses.
//!
//! No teacher repo in the corpus runs a TUI; this stack is adopted from
//! the broader example pack (`zhych125-rlless` and five other manifests
//! reach for `ratatui`/`crossterm`), since it is the idiomatic choice for
//! an interactive terminal tool regardless of which teacher was chosen.

mod input;
mod render;

use crate::engine::Engine;
use crate::error::AppResult;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub use input::Action;

/// Non-blocking poll interval (spec §4.F: "~10ms, never blocking the
/// render loop").
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Input-prompt state, local to the UI loop.
pub enum Mode {
    Normal,
    Prompt(String),
}

/// UI-loop-local state that isn't part of any search context (spec §3
/// scopes `UiCursor` per-context; the prompt mode and spinner frame are
/// loop-global instead).
pub struct UiState {
    pub mode: Mode,
    pub spinner_frame: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            spinner_frame: 0,
        }
    }
}

/// Runs the interactive UI until the user quits at the root context.
///
/// # Errors
///
/// Returns an [`crate::error::AppError::Io`] if the terminal cannot be
/// set up or torn down.
pub fn run(engine: &mut Engine) -> AppResult<()> {
    // A dedicated signal-set flag, not a handler-thread callback touching
    // the UI directly (spec §9: "prefer a self-pipe or signal-set-mask ...
    // that sets a shutdown flag all loops check"). This covers
    // process-level `kill -INT` delivery; an interactive Ctrl+C is instead
    // caught as a raw-mode key event (see `input::handle_normal_key`)
    // since enabling raw mode disables the terminal's own SIGINT
    // generation on that keystroke.
    let shutdown = Arc::new(AtomicBool::new(false));
    // Registration only fails if a handler for this signal already exists
    // or the signal number is reserved; neither recoverable nor expected
    // to happen twice within one process, so a register failure falls
    // back to interactive-only shutdown instead of aborting the search.
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = UiState::default();
    let result = event_loop(&mut terminal, engine, &mut state, &shutdown);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &mut Engine,
    state: &mut UiState,
    shutdown: &AtomicBool,
) -> AppResult<()> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return Ok(());
        }

        terminal.draw(|frame| render::draw(frame, engine, state))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => match input::handle_key(key, engine, state) {
                    Action::Continue => {}
                    Action::Quit => return Ok(()),
                    Action::OpenEditor { path, line_no } => {
                        let pattern = engine.active().pattern.clone();
                        let case_insensitive =
                            matches!(engine.active().mode, crate::matcher::MatchMode::LiteralCaseInsensitive);
                        crate::editor::open_at(&engine.editor_template, &path, line_no, &pattern, case_insensitive)?;
                        terminal.clear()?;
                    }
                },
                Event::Resize(_, _) => {}
                _ => {}
            }
        } else {
            state.spinner_frame = state.spinner_frame.wrapping_add(1);
        }
    }
}
