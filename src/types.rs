//! Type-safe newtypes shared across ngrip.
//!
//! These newtypes provide compile-time safety and semantic clarity
//! for core domain concepts: match-line numbering and the truncated
//! text a store entry actually holds.

use std::fmt;

/// Maximum byte length of stored match-line text (spec §3, §4.B).
///
/// A line longer than this is truncated to its first `MAX_LINE_BYTES`
/// bytes; truncation is silent and may split a multibyte sequence.
pub const MAX_LINE_BYTES: usize = 255;

/// 1-based line number within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineNo(pub u32);

impl LineNo {
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LineNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owned match-line text, silently truncated to [`MAX_LINE_BYTES`] bytes.
///
/// Truncation happens once, at construction, so a `Truncated` always
/// satisfies the byte-length invariant tested in spec §8 property 6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncated(Vec<u8>);

impl Truncated {
    /// Builds a truncated copy of `line`, dropping any bytes past
    /// [`MAX_LINE_BYTES`]. Multibyte continuation bytes may be split; this
    /// is intentional (spec §4.B: "lossy but intentional for display and
    /// memory bounds").
    #[must_use]
    pub fn new(line: &[u8]) -> Self {
        let len = line.len().min(MAX_LINE_BYTES);
        Self(line[..len].to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lossy UTF-8 view for display in the UI.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Compile-time assertions for thread safety.
#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<LineNo>();
    assert_send_sync::<Truncated>();
};
