//! Command-line argument parsing (spec §6).
//!
//! `ngrip [options] PATTERN [PATH]`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ngrip")]
#[command(about = "Interactive recursive pattern search")]
#[command(version)]
pub struct Cli {
    /// Case-insensitive literal search.
    #[arg(short = 'i')]
    pub insensitive: bool,

    /// Raw mode: scan every regular file, ignoring extension/specific-name
    /// filters.
    #[arg(short = 'r')]
    pub raw: bool,

    /// Add an extension to the allow-list (repeatable).
    #[arg(short = 't', value_name = "EXT")]
    pub add_extension: Vec<String>,

    /// Replace the extension and specific-filename lists with `{EXT}`.
    #[arg(short = 'o', value_name = "EXT")]
    pub only_extension: Option<String>,

    /// Treat PATTERN as a regular expression.
    #[arg(short = 'e')]
    pub regex: bool,

    /// Exclude a directory (repeatable); resolved to a filesystem node
    /// identifier at startup.
    #[arg(short = 'x', value_name = "DIR")]
    pub exclude: Vec<PathBuf>,

    /// Follow symlinks.
    #[arg(short = 'f')]
    pub follow_symlinks: bool,

    /// Pattern to search for.
    pub pattern: String,

    /// Root directory to search (defaults to the current directory).
    pub path: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
