//! Frame rendering (spec §4.F): the match list, a status bar, and the
//! subsearch prompt.
//!
//! Colors: yellow line numbers, red highlighted pattern, green file
//! headers, magenta reserved for the subsearch prompt.

use super::{Mode, UiState};
use crate::context::UiCursor;
use crate::engine::Engine;
use crate::store::{Entry, StoreStatus};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, Paragraph};
use ratatui::Frame;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub fn draw(frame: &mut Frame, engine: &mut Engine, state: &UiState) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    draw_list(frame, chunks[0], engine);

    match &state.mode {
        Mode::Prompt(buffer) => draw_prompt(frame, chunks[1], buffer),
        Mode::Normal => draw_status(frame, chunks[1], engine, state),
    }
}

fn draw_list(frame: &mut Frame, area: Rect, engine: &mut Engine) {
    let depth = engine.contexts.depth();
    let pattern = engine.active().pattern.clone();
    let ctx = engine.contexts.active_mut();
    let entries = ctx.store.read_all();
    let height = area.height as usize;

    normalize_cursor(&entries, &mut ctx.cursor, height);

    let selected = ctx.cursor.selected;
    let top = ctx.cursor.top;

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .skip(top)
        .take(height)
        .map(|(i, entry)| render_entry(entry, &ctx.matcher, i == selected))
        .collect();

    let title = if depth > 1 {
        format!(" {pattern} (subsearch, depth {depth}) ")
    } else {
        format!(" {pattern} ")
    };

    let list = List::new(items).block(
        ratatui::widgets::Block::default()
            .borders(ratatui::widgets::Borders::ALL)
            .title(title),
    );
    frame.render_widget(list, area);
}

/// Clamps `cursor.selected` into range, normalizes it off a header entry
/// (spec §4.F, §8 property 7: the selection never rests on a header —
/// this is what keeps a freshly created context, or a root store that
/// just received its first file while the cursor sat at the default
/// `selected: 0`, from showing the leading header as selected until the
/// next keypress), then keeps `cursor.top` in sync so the selection stays
/// within the viewport.
fn normalize_cursor(entries: &[Entry], cursor: &mut UiCursor, height: usize) {
    if entries.is_empty() {
        return;
    }
    if cursor.selected >= entries.len() {
        cursor.selected = entries.len() - 1;
    }
    if entries[cursor.selected].is_header() {
        cursor.selected = super::input::step_selection(entries, cursor.selected, 0);
    }
    if cursor.selected < cursor.top {
        cursor.top = cursor.selected;
    } else if height > 0 && cursor.selected >= cursor.top + height {
        cursor.top = cursor.selected + 1 - height;
    }
}

fn render_entry(entry: &Entry, matcher: &crate::matcher::Matcher, selected: bool) -> ListItem<'static> {
    let mut line = match entry {
        Entry::FileHeader { path } => Line::from(Span::styled(
            path.display().to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Entry::MatchLine { line_no, text } => {
            let display = text.to_display_string();
            let mut spans = vec![
                Span::styled(format!("{line_no:>6} "), Style::default().fg(Color::Yellow)),
                Span::raw(": "),
            ];
            spans.extend(highlight(&display, matcher));
            Line::from(spans)
        }
    };

    if selected {
        line = line.patch_style(Style::default().add_modifier(Modifier::REVERSED));
    }
    ListItem::new(line)
}

/// Splits `text` into spans, coloring the first match red (spec §4.F).
fn highlight(text: &str, matcher: &crate::matcher::Matcher) -> Vec<Span<'static>> {
    match matcher.find(text.as_bytes()) {
        Some((start, end)) if text.is_char_boundary(start) && text.is_char_boundary(end) => vec![
            Span::raw(text[..start].to_string()),
            Span::styled(text[start..end].to_string(), Style::default().fg(Color::Red)),
            Span::raw(text[end..].to_string()),
        ],
        _ => vec![Span::raw(text.to_string())],
    }
}

fn draw_status(frame: &mut Frame, area: Rect, engine: &Engine, state: &UiState) {
    let ctx = engine.active();
    let status = match ctx.store.status() {
        StoreStatus::Scanning => format!("{} scanning…", SPINNER_FRAMES[state.spinner_frame % SPINNER_FRAMES.len()]),
        StoreStatus::Done => "Done.".to_string(),
    };
    let text = format!(
        " {status}  {} matches  [/ subsearch] [Enter/p open] [q back/quit]",
        ctx.store.match_count()
    );
    frame.render_widget(Paragraph::new(text), area);
}

fn draw_prompt(frame: &mut Frame, area: Rect, buffer: &str) {
    let line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
        Span::raw(buffer.to_string()),
        Span::styled("_", Style::default().fg(Color::Magenta)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
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
        ]
    }

    #[test]
    fn fresh_cursor_at_zero_is_moved_off_the_leading_header() {
        let e = entries();
        let mut cursor = UiCursor::default();
        assert_eq!(cursor.selected, 0);
        normalize_cursor(&e, &mut cursor, 10);
        assert!(!e[cursor.selected].is_header());
        assert_eq!(cursor.selected, 1);
    }

    #[test]
    fn normalize_is_a_no_op_once_already_on_a_match_line() {
        let e = entries();
        let mut cursor = UiCursor { top: 0, selected: 2 };
        normalize_cursor(&e, &mut cursor, 10);
        assert_eq!(cursor.selected, 2);
    }

    #[test]
    fn empty_store_leaves_cursor_untouched() {
        let mut cursor = UiCursor::default();
        normalize_cursor(&[], &mut cursor, 10);
        assert_eq!(cursor.selected, 0);
    }
}
