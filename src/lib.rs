//! ngrip: interactive recursive pattern search with live results and
//! subsearches.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI (ratatui)                        │
//! │         renders the active context, polls crossterm      │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │ reads
//! ┌───────────────────────────▼────────────────────────────────┐
//! │                    ContextStack / Engine                   │
//! │   pattern, matcher, root, ResultStore, UiCursor per level   │
//! └───────────────────────────┬────────────────────────────────┘
//!                             │ feeds (root context only)
//! ┌───────────────────────────▼────────────────────────────────┐
//! │                    Search pipeline                          │
//! │  walker → { scan worker 0, scan worker 1 } → consumer        │
//! │       synchronized by named counting semaphores              │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod editor;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod scanner;
pub mod store;
pub mod subsearch;
pub mod types;
pub mod ui;
pub mod walker;

pub use error::{AppError, AppResult};
