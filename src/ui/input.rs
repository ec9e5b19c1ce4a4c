//! Key bindings (spec §4.F): navigation, jumping to the editor,
//! subsearch prompting, and popping/quitting.

use super::{Mode, UiState};
use crate::engine::Engine;
use crate::store::Entry;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

/// Lines moved by a page (`K`/`J`/PageUp/PageDown), spec §4.F.
const PAGE_SIZE: isize = 10;

/// What the UI loop should do after a key press.
pub enum Action {
    Continue,
    Quit,
    OpenEditor { path: PathBuf, line_no: u32 },
}

pub fn handle_key(key: KeyEvent, engine: &mut Engine, state: &mut UiState) -> Action {
    match &mut state.mode {
        Mode::Prompt(buffer) => {
            let (action, exit_prompt) = handle_prompt_key(key, buffer, engine);
            if exit_prompt {
                state.mode = Mode::Normal;
            }
            action
        }
        Mode::Normal => handle_normal_key(key, engine, state),
    }
}

/// Returns the resulting action plus whether the prompt should close.
fn handle_prompt_key(key: KeyEvent, buffer: &mut String, engine: &mut Engine) -> (Action, bool) {
    match key.code {
        KeyCode::Esc => (Action::Continue, true),
        KeyCode::Enter => {
            let pattern = std::mem::take(buffer);
            if !pattern.is_empty() {
                // An invalid subsearch pattern is rejected, not fatal
                // (spec §7); the prompt simply closes without pushing a
                // new context.
                let _ = engine.subsearch(&pattern);
            }
            (Action::Continue, true)
        }
        KeyCode::Backspace => {
            buffer.pop();
            (Action::Continue, false)
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            (Action::Continue, false)
        }
        _ => (Action::Continue, false),
    }
}

fn handle_normal_key(key: KeyEvent, engine: &mut Engine, state: &mut UiState) -> Action {
    // Raw mode intercepts Ctrl+C as a regular key event rather than
    // raising SIGINT (spec §7/§9: an interrupt must still tear the
    // terminal down cleanly), so it's handled as an unconditional quit
    // here instead of relying on a signal handler.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(engine, -1);
            Action::Continue
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(engine, 1);
            Action::Continue
        }
        KeyCode::PageUp | KeyCode::Char('K') => {
            move_selection(engine, -PAGE_SIZE);
            Action::Continue
        }
        KeyCode::PageDown | KeyCode::Char('J') => {
            move_selection(engine, PAGE_SIZE);
            Action::Continue
        }
        KeyCode::Enter | KeyCode::Char('p') => open_selected(engine),
        KeyCode::Char('/') => {
            state.mode = Mode::Prompt(String::new());
            Action::Continue
        }
        KeyCode::Char('q') => {
            if engine.pop_context() {
                Action::Continue
            } else {
                Action::Quit
            }
        }
        _ => Action::Continue,
    }
}

fn move_selection(engine: &mut Engine, delta: isize) {
    let ctx = engine.contexts.active_mut();
    let entries = ctx.store.read_all();
    if entries.is_empty() {
        return;
    }
    ctx.cursor.selected = step_selection(&entries, ctx.cursor.selected, delta);
}

/// Moves `current` by `delta` entries, then skips any file-header landed
/// on — the selection is never allowed to rest on a header (spec §4.F:
/// "selection skips file headers"). `delta == 0` is used by the render
/// path to normalize a selection that a header-only `current` would
/// otherwise leave in place (e.g. index 0, right after a context is
/// created or its store's first file arrives).
pub(super) fn step_selection(entries: &[Entry], current: usize, delta: isize) -> usize {
    let len = entries.len() as isize;
    if len == 0 {
        return 0;
    }
    let mut idx = (current as isize + delta).clamp(0, len - 1);
    let step: isize = if delta >= 0 { 1 } else { -1 };

    while (0..len).contains(&idx) && entries[idx as usize].is_header() {
        idx += step;
    }

    if !(0..len).contains(&idx) {
        // Ran off the end looking for a non-header entry; search back
        // from the original position instead.
        idx = current as isize;
        while (0..len).contains(&idx) && entries[idx as usize].is_header() {
            idx -= step;
        }
    }

    idx.clamp(0, len - 1) as usize
}

fn open_selected(engine: &mut Engine) -> Action {
    let ctx = engine.active();
    let entries = ctx.store.read_all();
    let Some(Entry::MatchLine { line_no, .. }) = entries.get(ctx.cursor.selected) else {
        return Action::Continue;
    };
    let line_no = *line_no;
    let Some(header_idx) = ctx.store.find_containing_file(ctx.cursor.selected) else {
        return Action::Continue;
    };
    let Some(path) = entries.get(header_idx).and_then(Entry::as_header) else {
        return Action::Continue;
    };

    Action::OpenEditor {
        path: path.to_path_buf(),
        line_no: line_no.get(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LineNo, Truncated};
    use std::path::PathBuf;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::FileHeader { path: PathBuf::from("a.c") },
            Entry::MatchLine { line_no: LineNo::new(1), text: Truncated::new(b"one") },
            Entry::MatchLine { line_no: LineNo::new(2), text: Truncated::new(b"two") },
            Entry::FileHeader { path: PathBuf::from("b.c") },
            Entry::MatchLine { line_no: LineNo::new(7), text: Truncated::new(b"three") },
        ]
    }

    #[test]
    fn stepping_down_skips_headers() {
        let e = entries();
        assert_eq!(step_selection(&e, 1, 1), 2);
        assert_eq!(step_selection(&e, 2, 1), 4);
    }

    #[test]
    fn stepping_up_skips_headers() {
        let e = entries();
        assert_eq!(step_selection(&e, 4, -1), 2);
        assert_eq!(step_selection(&e, 2, -1), 1);
    }

    #[test]
    fn never_lands_on_index_zero_header() {
        let e = entries();
        assert_eq!(step_selection(&e, 1, -5), 1);
    }
}
