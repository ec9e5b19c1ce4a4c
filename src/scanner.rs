//! File scanner (spec §4.B): memory-maps one file and scans it for
//! matching lines, split into two halves for the pipeline's two workers.
//!
//! Uses `memmap2` for a safe-API memory-mapped read, in place of the
//! original program's read-write-private mapping with a manual trailing
//! NUL insertion — that trick exists purely to give the original's C
//! string functions a terminator to stop at, which has no externally
//! observable effect here since line-splitting is done explicitly on `\n`
//! rather than by scanning for a NUL.

use crate::error::ScanError;
use crate::matcher::Matcher;
use crate::types::{LineNo, Truncated};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Memory-maps `path` for reading. Returns `Ok(None)` for a zero-length
/// file, since an empty mapping has nothing to scan and some platforms
/// reject mapping a zero-length file outright.
pub fn map_file(path: &Path) -> Result<Option<Mmap>, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| ScanError::Stat {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if len == 0 {
        return Ok(None);
    }
    // SAFETY: the mapped file is not expected to be truncated by another
    // process during the scan; a concurrent truncation could raise SIGBUS,
    // which is an accepted risk shared with the original program's own
    // mmap-based read.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ScanError::Mmap {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(mmap))
}

/// Computes where to split `data` for two-worker scanning: the byte index
/// at which the second half begins, and the 1-based line number that
/// begins there (spec §4.B: "split at the first newline at or after the
/// file's midpoint, so neither worker scans a partial line").
#[must_use]
pub fn compute_split(data: &[u8]) -> (usize, u32) {
    let mid = data.len() / 2;
    let split = if mid >= data.len() {
        data.len()
    } else {
        match data[mid..].iter().position(|&b| b == b'\n') {
            Some(offset) => mid + offset + 1,
            None => data.len(),
        }
    };
    let second_start_line = 1 + count_newlines(&data[..split]);
    (split, second_start_line)
}

fn count_newlines(data: &[u8]) -> u32 {
    u32::try_from(data.iter().filter(|&&b| b == b'\n').count()).unwrap_or(u32::MAX)
}

/// Scans `data` line by line, starting at `starting_line`, returning every
/// line the matcher accepts, truncated to the stored-text byte limit.
///
/// A final line with no trailing newline is still scanned (spec §4.B).
#[must_use]
pub fn scan_range(data: &[u8], starting_line: u32, matcher: &Matcher) -> Vec<(LineNo, Truncated)> {
    let mut out = Vec::new();
    let mut line_no = starting_line;
    let mut start = 0usize;

    while start < data.len() {
        let end = match data[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => start + offset,
            None => data.len(),
        };
        let line = &data[start..end];
        if matcher.is_match(line) {
            out.push((LineNo::new(line_no), Truncated::new(line)));
        }
        line_no += 1;
        start = end + 1;
    }

    out
}

/// Scans an entire file on the calling thread, without splitting it
/// across two workers. Used directly by tests and by the pipeline when a
/// file is too small to be worth splitting.
///
/// # Errors
///
/// Returns [`ScanError`] if the file cannot be opened, stat'd, or mapped.
pub fn scan_file(path: &Path, matcher: &Matcher) -> Result<Vec<(LineNo, Truncated)>, ScanError> {
    let Some(mmap) = map_file(path)? else {
        return Ok(Vec::new());
    };
    Ok(scan_range(&mmap, 1, matcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{MatchMode, Matcher};
    use tempfile::NamedTempFile;

    fn literal(pattern: &str) -> Matcher {
        Matcher::compile(pattern, MatchMode::LiteralCaseSensitive).unwrap()
    }

    #[test]
    fn scan_range_finds_matching_lines_and_numbers_them() {
        let data = b"one\nhello\nthree\nhello world\n";
        let matches = scan_range(data, 1, &literal("hello"));
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].0, LineNo::new(2));
        assert_eq!(matches[1].0, LineNo::new(4));
    }

    #[test]
    fn scan_range_handles_missing_trailing_newline() {
        let data = b"hello\nworld";
        let matches = scan_range(data, 1, &literal("world"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, LineNo::new(2));
    }

    #[test]
    fn compute_split_lands_on_a_newline_boundary() {
        let data = b"aaaa\nbbbb\ncccc\ndddd\n";
        let (split, second_start_line) = compute_split(data);
        assert_eq!(&data[split - 1], &b'\n');
        assert_eq!(second_start_line, count_newlines(&data[..split]) + 1);
    }

    #[test]
    fn split_halves_reassemble_to_the_same_matches_as_a_single_scan() {
        let data = b"hello\nworld\nhello again\nfoo\nhello\n";
        let whole = scan_range(data, 1, &literal("hello"));

        let (split, second_start_line) = compute_split(data);
        let mut halves = scan_range(&data[..split], 1, &literal("hello"));
        halves.extend(scan_range(&data[split..], second_start_line, &literal("hello")));

        assert_eq!(whole, halves);
    }

    #[test]
    fn empty_file_yields_no_matches() {
        let file = NamedTempFile::new().unwrap();
        let matches = scan_file(file.path(), &literal("anything")).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn scan_file_reads_through_mmap() {
        let mut file = NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"nope\nfound it\n").unwrap();
        let matches = scan_file(file.path(), &literal("found")).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, LineNo::new(2));
    }
}
