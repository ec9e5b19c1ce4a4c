//! Subsearch engine (spec §4.G): derives a child result store by
//! re-filtering a parent's store with a new pattern.
//!
//! Subsearches are always regex, even when the user types a literal
//! pattern — the parent's match mode is not inherited for matching
//! purposes (spec §4.G: "a literal pattern is still compiled as a regex").
//! The child store is built entirely synchronously and marked done before
//! it becomes the active context.

use crate::context::SearchContext;
use crate::error::PatternResult;
use crate::matcher::{MatchMode, Matcher};
use crate::store::{Entry, ResultStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Builds a subsearch context from `parent` by re-filtering its store with
/// `pattern`, compiled as regex.
///
/// # Errors
///
/// Returns the pattern compile error without touching `parent` — per
/// spec §7, an invalid subsearch pattern is "rejected", not fatal.
pub fn subsearch(parent: &SearchContext, pattern: &str) -> PatternResult<SearchContext> {
    let matcher = Matcher::compile(pattern, MatchMode::Regex)?;
    let child_store = filter_into_new_store(&parent.store, &matcher);
    Ok(SearchContext {
        pattern: pattern.to_string(),
        mode: MatchMode::Regex,
        matcher,
        root: parent.root.clone(),
        store: Arc::new(child_store),
        cursor: crate::context::UiCursor::default(),
    })
}

/// Re-filters `parent`'s entries into a brand-new, already-`done` store.
fn filter_into_new_store(parent: &ResultStore, matcher: &Matcher) -> ResultStore {
    let child = ResultStore::new();
    let mut pending_header: Option<PathBuf> = None;

    for entry in parent.read_all() {
        match entry {
            Entry::FileHeader { path } => {
                // A header with no matching lines before the next header
                // (or end of store) is simply dropped — never flushed.
                pending_header = Some(path);
            }
            Entry::MatchLine { line_no, text } => {
                if matcher.is_match(text.as_bytes()) {
                    if let Some(path) = pending_header.take() {
                        child.append_header(path);
                    }
                    child.append_line(line_no, text);
                }
            }
        }
    }

    child.set_done();
    child
}
