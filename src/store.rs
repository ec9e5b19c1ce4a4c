//! Result store: the append-only growable ordered sequence of entries that
//! backs one search context (spec §3, §4.D).
//!
//! Mutation is serialized by a single lock; appenders are the consumer
//! thread only, readers are the UI thread only (spec §5).

use crate::types::{LineNo, Truncated};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

const INITIAL_CAPACITY: usize = 100;
const GROWTH_STEP: usize = 500;

/// One atom in a result store (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    FileHeader { path: PathBuf },
    MatchLine { line_no: LineNo, text: Truncated },
}

impl Entry {
    #[must_use]
    pub fn as_header(&self) -> Option<&Path> {
        match self {
            Self::FileHeader { path } => Some(path),
            Self::MatchLine { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_header(&self) -> bool {
        matches!(self, Self::FileHeader { .. })
    }
}

/// Whether a store is still being populated by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Scanning,
    Done,
}

struct Inner {
    entries: Vec<Entry>,
    status: StoreStatus,
}

/// Append-only growable ordered sequence of entries for one search context.
pub struct ResultStore {
    inner: Mutex<Inner>,
    total_entries: AtomicUsize,
    total_matches: AtomicUsize,
    /// Bumped on every append; lets the UI cheaply decide whether a redraw
    /// is warranted without re-locking to compare content (spec §4.D: "the
    /// store signals the UI to refresh ... the UI may also poll").
    version: AtomicU64,
}

impl ResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::with_capacity(INITIAL_CAPACITY),
                status: StoreStatus::Scanning,
            }),
            total_entries: AtomicUsize::new(0),
            total_matches: AtomicUsize::new(0),
            version: AtomicU64::new(0),
        }
    }

    fn grow_if_full(entries: &mut Vec<Entry>) {
        if entries.len() == entries.capacity() {
            entries.reserve(GROWTH_STEP);
        }
    }

    /// Appends a file-header entry. O(1) amortized (spec §4.D growth policy).
    pub fn append_header(&self, path: PathBuf) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::grow_if_full(&mut inner.entries);
        inner.entries.push(Entry::FileHeader { path });
        self.total_entries.fetch_add(1, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Appends a match-line entry.
    pub fn append_line(&self, line_no: LineNo, text: Truncated) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Self::grow_if_full(&mut inner.entries);
        inner.entries.push(Entry::MatchLine { line_no, text });
        self.total_entries.fetch_add(1, Ordering::Relaxed);
        self.total_matches.fetch_add(1, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Appends a header immediately followed by its match lines, as a
    /// single critical section (spec §5: "the consumer appends header then
    /// lines under the store lock in a single critical section per file" —
    /// this guarantees the UI never observes a header without its lines).
    pub fn append_file(&self, path: PathBuf, lines: impl IntoIterator<Item = (LineNo, Truncated)>) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut added = 0usize;
        let mut matched = 0usize;
        Self::grow_if_full(&mut inner.entries);
        inner.entries.push(Entry::FileHeader { path });
        added += 1;
        for (line_no, text) in lines {
            Self::grow_if_full(&mut inner.entries);
            inner.entries.push(Entry::MatchLine { line_no, text });
            added += 1;
            matched += 1;
        }
        self.total_entries.fetch_add(added, Ordering::Relaxed);
        self.total_matches.fetch_add(matched, Ordering::Relaxed);
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Snapshots the first `n` entries for display.
    #[must_use]
    pub fn read_prefix(&self, n: usize) -> Vec<Entry> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.entries.iter().take(n).cloned().collect()
    }

    /// Snapshots every entry. Used by the subsearch engine, which needs the
    /// whole parent store (spec §4.G).
    #[must_use]
    pub fn read_all(&self) -> Vec<Entry> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.entries.clone()
    }

    /// Returns the index of the nearest file header at or before `i`, by
    /// linear backward scan (spec §4.D). Correctness relies on the
    /// invariant that a header always precedes its match lines.
    #[must_use]
    pub fn find_containing_file(&self, i: usize) -> Option<usize> {
        let inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if inner.entries.is_empty() {
            return None;
        }
        let bound = i.min(inner.entries.len() - 1);
        inner.entries[..=bound]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.is_header())
            .map(|(idx, _)| idx)
    }

    /// Marks the store as fully populated. Idempotent.
    pub fn set_done(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.status = StoreStatus::Done;
        self.version.fetch_add(1, Ordering::Release);
    }

    #[must_use]
    pub fn status(&self) -> StoreStatus {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).status
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.total_entries.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.total_matches.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}
