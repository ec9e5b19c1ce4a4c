//! Error types for ngrip.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or parsing the config file and CLI flags.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no config file found at /etc/ngprc or ./ngprc")]
    Missing,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no editor template found in config for editor '{editor}'")]
    NoEditorTemplate { editor: String },

    #[error("excluded directory {path} could not be resolved: {source}")]
    ExcludedDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while compiling a pattern into a [`crate::matcher::Matcher`].
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("empty pattern")]
    Empty,
}

/// Errors raised while scanning a single file.
///
/// All of these are handled by skipping the file, never by aborting the
/// pipeline, except [`ScanError::Alloc`] — see [`ScanError::is_fatal`].
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to map {path}: {source}")]
    Mmap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("allocation failure while scanning {path}")]
    Alloc { path: PathBuf },
}

impl ScanError {
    /// Per spec.md §7: every scan error is recoverable by skipping the file
    /// except an allocation failure, which is fatal for the whole process.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Alloc { .. })
    }
}

/// Errors surfaced from the pipeline coordinator itself (not per-file).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Top-level error aggregating every subsystem, used at the `main` boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for config operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result alias for matcher construction.
pub type PatternResult<T> = std::result::Result<T, PatternError>;

/// Result alias for top-level operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
