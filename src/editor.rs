//! Editor launcher (spec §4.I): suspends the terminal UI, runs the
//! configured editor against the selected match, and resumes the UI.

use crate::config;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use std::path::Path;
use std::process::Command;

/// Suspends raw-mode/alternate-screen terminal state, runs the editor
/// template expanded for `file`/`line_number`/`pattern`, waits for it to
/// exit, and restores the terminal. The editor's exit code is ignored
/// (spec §4.I: "runs synchronously; its result is not otherwise acted
/// on").
///
/// # Errors
///
/// Returns an [`io::Error`] if the terminal cannot be suspended/restored
/// or the editor process cannot be spawned.
pub fn open_at(
    template: &str,
    file: &Path,
    line_number: u32,
    pattern: &str,
    case_insensitive: bool,
) -> io::Result<()> {
    let command_line = config::expand_editor_template(template, line_number, file, pattern, case_insensitive);

    crossterm::terminal::disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;

    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string());
    let status = Command::new(shell).arg("-c").arg(&command_line).status();

    execute!(io::stdout(), EnterAlternateScreen)?;
    crossterm::terminal::enable_raw_mode()?;

    status.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_is_built_from_the_template() {
        let line = config::expand_editor_template(
            "vim +{line} '+/{pattern}{case}' {file}",
            12,
            Path::new("src/main.rs"),
            "needle",
            false,
        );
        assert_eq!(line, "vim +12 '+/needle' src/main.rs");
    }
}
