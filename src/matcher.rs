//! Matcher: a byte-range predicate over one line, built from the CLI's
//! chosen pattern and mode (spec §4.A).
//!
//! Modeled as a tagged variant rather than a trait object (spec §9,
//! "Dynamic dispatch of matchers") since the three cases are closed and the
//! hot path (the file scanner calling `is_match` per line) benefits from
//! avoiding a vtable indirection.

use crate::error::{PatternError, PatternResult};
use std::fmt;

/// How the CLI's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    LiteralCaseSensitive,
    LiteralCaseInsensitive,
    Regex,
}

/// A compiled pattern-predicate over a single line's bytes.
pub enum Matcher {
    /// Hand-rolled case-sensitive literal search (spec §4.A.1).
    CaseSensitive(CaseSensitiveLiteral),
    /// ASCII case-insensitive literal search, non-ASCII bytes compare by
    /// identity (spec §4.A.2) — implemented with `regex`'s `(?i)` mode over
    /// an escaped literal, which is the "library-quality" engine the teacher
    /// crate already depends on. Built on `regex::bytes::Regex` with Unicode
    /// mode off so the match is over raw bytes and case-folding is ASCII-only
    /// (no Unicode case-folding — e.g. U+212A KELVIN SIGN must not fold to
    /// `k`, and a non-UTF-8 line must be matched as-is, not lossily decoded).
    Insensitive(regex::bytes::Regex),
    /// POSIX-like extended regex (spec §4.A.3), also used unconditionally
    /// for subsearches (spec §4.G). Built on `regex::bytes::Regex` so lines
    /// that aren't valid UTF-8 (raw mode exists precisely to allow scanning
    /// such files) are matched directly rather than through a lossy decode.
    Regex(regex::bytes::Regex),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaseSensitive(m) => write!(f, "Matcher::CaseSensitive({m:?})"),
            Self::Insensitive(r) => write!(f, "Matcher::Insensitive({r})"),
            Self::Regex(r) => write!(f, "Matcher::Regex({r})"),
        }
    }
}

impl Matcher {
    /// Compiles `pattern` under `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Empty`] for an empty pattern, or
    /// [`PatternError::InvalidRegex`] when `mode` is [`MatchMode::Regex`]
    /// and the pattern fails to compile.
    pub fn compile(pattern: &str, mode: MatchMode) -> PatternResult<Self> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        match mode {
            MatchMode::LiteralCaseSensitive => {
                Ok(Self::CaseSensitive(CaseSensitiveLiteral::new(pattern.as_bytes())))
            }
            MatchMode::LiteralCaseInsensitive => {
                let escaped = regex::escape(pattern);
                // `.unicode(false)` keeps case-folding ASCII-only, per spec
                // §4.A.2: non-ASCII bytes must compare by identity, never
                // fold to an ASCII letter (e.g. U+212A KELVIN SIGN must not
                // match `k`).
                let re = regex::bytes::RegexBuilder::new(&escaped)
                    .case_insensitive(true)
                    .unicode(false)
                    .build()
                    .map_err(|e| PatternError::InvalidRegex {
                        pattern: pattern.to_string(),
                        source: Box::new(e),
                    })?;
                Ok(Self::Insensitive(re))
            }
            MatchMode::Regex => {
                let re = regex::bytes::Regex::new(pattern).map_err(|e| PatternError::InvalidRegex {
                    pattern: pattern.to_string(),
                    source: Box::new(e),
                })?;
                Ok(Self::Regex(re))
            }
        }
    }

    /// Returns whether `line` (one line's bytes, without its terminator)
    /// contains the configured pattern.
    #[must_use]
    pub fn is_match(&self, line: &[u8]) -> bool {
        match self {
            Self::CaseSensitive(m) => m.is_match(line),
            // `regex::bytes::Regex` matches directly over `&[u8]` — no
            // UTF-8 decode (lossy or otherwise), so a non-UTF-8 line (raw
            // mode) is matched against its real bytes.
            Self::Insensitive(re) | Self::Regex(re) => re.is_match(line),
        }
    }

    /// Returns the byte range of the first match in `line`, for UI
    /// highlighting. `None` if there is no match.
    #[must_use]
    pub fn find(&self, line: &[u8]) -> Option<(usize, usize)> {
        match self {
            Self::CaseSensitive(m) => m.find(line),
            Self::Insensitive(re) | Self::Regex(re) => re.find(line).map(|m| (m.start(), m.end())),
        }
    }
}

/// The case-sensitive literal matcher (spec §4.A.1): one of three
/// sub-algorithms chosen once, at construction, based on the pattern.
pub enum CaseSensitiveLiteral {
    /// Boyer-Moore-Horspool, used when the pattern is ASCII (no byte with
    /// the high bit set) and longer than one byte.
    Bmh(BmhState),
    /// 8-bit-clean rolling-hash matcher, used when any pattern byte has the
    /// high bit set (the skip table's single-byte indexing would misalign
    /// multibyte sequences).
    RabinKarp(RabinKarpState),
    /// Direct byte search for single-byte patterns.
    SingleByte(u8),
}

impl fmt::Debug for CaseSensitiveLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bmh(s) => write!(f, "Bmh({:?})", String::from_utf8_lossy(&s.pattern)),
            Self::RabinKarp(s) => write!(f, "RabinKarp({:?})", String::from_utf8_lossy(&s.pattern)),
            Self::SingleByte(b) => write!(f, "SingleByte({b:#04x})"),
        }
    }
}

impl CaseSensitiveLiteral {
    #[must_use]
    pub fn new(pattern: &[u8]) -> Self {
        if pattern.len() == 1 {
            Self::SingleByte(pattern[0])
        } else if pattern.iter().any(|&b| b & 0x80 != 0) {
            Self::RabinKarp(RabinKarpState::new(pattern))
        } else {
            Self::Bmh(BmhState::new(pattern))
        }
    }

    #[must_use]
    pub fn is_match(&self, line: &[u8]) -> bool {
        match self {
            Self::Bmh(s) => s.is_match(line),
            Self::RabinKarp(s) => s.is_match(line),
            Self::SingleByte(b) => line.contains(b),
        }
    }

    #[must_use]
    pub fn find(&self, line: &[u8]) -> Option<(usize, usize)> {
        match self {
            Self::Bmh(s) => s.find(line),
            Self::RabinKarp(s) => s.find(line),
            Self::SingleByte(b) => line.iter().position(|byte| byte == b).map(|i| (i, i + 1)),
        }
    }
}

/// Boyer-Moore-Horspool state: the pattern plus its 256-entry skip table.
pub struct BmhState {
    pattern: Vec<u8>,
    skip: [usize; 256],
}

impl BmhState {
    #[must_use]
    pub fn new(pattern: &[u8]) -> Self {
        let m = pattern.len();
        let mut skip = [m; 256];
        // skip[c] = pattern_len - i - 1 for the last occurrence of c in
        // pattern[0..pattern_len-1], else pattern_len (spec §4.A.1).
        for (i, &b) in pattern[..m - 1].iter().enumerate() {
            skip[b as usize] = m - i - 1;
        }
        Self {
            pattern: pattern.to_vec(),
            skip,
        }
    }

    #[must_use]
    pub fn is_match(&self, text: &[u8]) -> bool {
        let m = self.pattern.len();
        let n = text.len();
        if n < m {
            return false;
        }
        let mut i = 0usize;
        while i + m <= n {
            let anchor = text[i + m - 1];
            // A high-bit anchor byte may be a multibyte lead/continuation
            // byte; the skip table was built purely over the (ASCII)
            // pattern and doesn't know how to realign past it, so advance
            // a full pattern length instead (spec §4.A.1).
            if anchor & 0x80 != 0 {
                i += m;
                continue;
            }
            // Last char first, then first char, then the middle.
            if anchor == self.pattern[m - 1]
                && text[i] == self.pattern[0]
                && text[i..i + m] == self.pattern[..]
            {
                return true;
            }
            i += self.skip[anchor as usize];
        }
        false
    }

    #[must_use]
    pub fn find(&self, text: &[u8]) -> Option<(usize, usize)> {
        let m = self.pattern.len();
        let n = text.len();
        if n < m {
            return None;
        }
        let mut i = 0usize;
        while i + m <= n {
            let anchor = text[i + m - 1];
            if anchor & 0x80 != 0 {
                i += m;
                continue;
            }
            if anchor == self.pattern[m - 1]
                && text[i] == self.pattern[0]
                && text[i..i + m] == self.pattern[..]
            {
                return Some((i, i + m));
            }
            i += self.skip[anchor as usize];
        }
        None
    }
}

/// Rolling-hash (Rabin-Karp) matcher, 8-bit clean — used when the pattern
/// contains a byte with the high bit set.
pub struct RabinKarpState {
    pattern: Vec<u8>,
    pattern_hash: u64,
    base_pow: u64,
}

const RK_BASE: u64 = 257;

impl RabinKarpState {
    #[must_use]
    pub fn new(pattern: &[u8]) -> Self {
        let m = pattern.len();
        let mut pattern_hash = 0u64;
        for &b in pattern {
            pattern_hash = pattern_hash.wrapping_mul(RK_BASE).wrapping_add(u64::from(b));
        }
        let mut base_pow = 1u64;
        for _ in 1..m {
            base_pow = base_pow.wrapping_mul(RK_BASE);
        }
        Self {
            pattern: pattern.to_vec(),
            pattern_hash,
            base_pow,
        }
    }

    #[must_use]
    pub fn is_match(&self, text: &[u8]) -> bool {
        let m = self.pattern.len();
        let n = text.len();
        if n < m {
            return false;
        }
        let mut h = 0u64;
        for &b in &text[..m] {
            h = h.wrapping_mul(RK_BASE).wrapping_add(u64::from(b));
        }
        if h == self.pattern_hash && text[..m] == self.pattern[..] {
            return true;
        }
        for i in m..n {
            h = h.wrapping_sub((u64::from(text[i - m])).wrapping_mul(self.base_pow));
            h = h.wrapping_mul(RK_BASE).wrapping_add(u64::from(text[i]));
            if h == self.pattern_hash && text[i + 1 - m..=i] == self.pattern[..] {
                return true;
            }
        }
        false
    }

    #[must_use]
    pub fn find(&self, text: &[u8]) -> Option<(usize, usize)> {
        let m = self.pattern.len();
        let n = text.len();
        if n < m {
            return None;
        }
        let mut h = 0u64;
        for &b in &text[..m] {
            h = h.wrapping_mul(RK_BASE).wrapping_add(u64::from(b));
        }
        if h == self.pattern_hash && text[..m] == self.pattern[..] {
            return Some((0, m));
        }
        for i in m..n {
            h = h.wrapping_sub((u64::from(text[i - m])).wrapping_mul(self.base_pow));
            h = h.wrapping_mul(RK_BASE).wrapping_add(u64::from(text[i]));
            if h == self.pattern_hash && text[i + 1 - m..=i] == self.pattern[..] {
                return Some((i + 1 - m, i + 1));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmh_finds_substring() {
        let m = CaseSensitiveLiteral::new(b"hello");
        assert!(m.is_match(b"say hello world"));
        assert!(!m.is_match(b"say HELLO world"));
    }

    #[test]
    fn bmh_no_match_at_end() {
        let m = CaseSensitiveLiteral::new(b"world");
        assert!(m.is_match(b"hello world"));
        assert!(!m.is_match(b"hello there"));
    }

    #[test]
    fn single_byte_pattern() {
        let m = CaseSensitiveLiteral::new(b"z");
        assert!(matches!(m, CaseSensitiveLiteral::SingleByte(b'z')));
        assert!(m.is_match(b"buzz"));
        assert!(!m.is_match(b"fizz fizz"));
    }

    #[test]
    fn high_bit_pattern_uses_rabin_karp() {
        let pattern = [b'a', 0x80, b'b'];
        let m = CaseSensitiveLiteral::new(&pattern);
        assert!(matches!(m, CaseSensitiveLiteral::RabinKarp(_)));
        let text = [b'x', b'a', 0x80, b'b', b'y'];
        assert!(m.is_match(&text));
        assert!(!m.is_match(b"abc"));
    }

    #[test]
    fn case_insensitive_matches_regardless_of_case() {
        let matcher = Matcher::compile("HELLO", MatchMode::LiteralCaseInsensitive).unwrap();
        assert!(matcher.is_match(b"say hello world"));
        assert!(matcher.is_match(b"say HELLO world"));
        assert!(!matcher.is_match(b"say goodbye"));
    }

    #[test]
    fn case_insensitive_escapes_regex_metacharacters() {
        let matcher = Matcher::compile("a.b", MatchMode::LiteralCaseInsensitive).unwrap();
        assert!(matcher.is_match(b"a.b"));
        assert!(!matcher.is_match(b"axb"));
    }

    #[test]
    fn case_insensitive_does_not_unicode_case_fold_non_ascii_bytes() {
        // U+212A KELVIN SIGN (UTF-8: 0xE2 0x84 0xAA) Unicode-case-folds to
        // 'k'/'K'; non-ASCII bytes must compare by identity instead (spec
        // §4.A.2), so a pattern of "k" must not match it.
        let matcher = Matcher::compile("k", MatchMode::LiteralCaseInsensitive).unwrap();
        let kelvin_sign = "\u{212A}".as_bytes();
        assert!(!matcher.is_match(kelvin_sign));
        assert!(matcher.is_match(b"K"));
        assert!(matcher.is_match(b"k"));
    }

    #[test]
    fn case_insensitive_matches_non_utf8_bytes_without_lossy_decoding() {
        // A lossy UTF-8 decode would turn an invalid byte into U+FFFD,
        // potentially manufacturing or masking a match; matching must
        // happen directly over the raw bytes instead (raw mode exists
        // precisely to scan files that aren't valid UTF-8).
        let matcher = Matcher::compile("bad", MatchMode::LiteralCaseInsensitive).unwrap();
        let line = [0xFFu8, b'B', b'A', b'D', 0xFE];
        assert!(matcher.is_match(&line));
        assert_eq!(matcher.find(&line), Some((1, 4)));
    }

    #[test]
    fn regex_mode_matches_non_utf8_bytes_without_lossy_decoding() {
        let matcher = Matcher::compile("ba+d", MatchMode::Regex).unwrap();
        let line = [0xFFu8, b'b', b'a', b'a', b'd', 0xFE];
        assert!(matcher.is_match(&line));
    }

    #[test]
    fn regex_mode_compiles_and_matches() {
        let matcher = Matcher::compile("fo+", MatchMode::Regex).unwrap();
        assert!(matcher.is_match(b"foo bar foooo"));
        assert!(!matcher.is_match(b"bar"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let result = Matcher::compile("(unclosed", MatchMode::Regex);
        assert!(result.is_err());
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let result = Matcher::compile("", MatchMode::Regex);
        assert!(matches!(result, Err(PatternError::Empty)));
    }

    #[test]
    fn find_returns_the_matched_byte_range() {
        let matcher = Matcher::compile("hello", MatchMode::LiteralCaseSensitive).unwrap();
        assert_eq!(matcher.find(b"say hello world"), Some((4, 9)));
        assert_eq!(matcher.find(b"say goodbye"), None);
    }

    #[test]
    fn find_works_for_regex_mode() {
        let matcher = Matcher::compile("fo+", MatchMode::Regex).unwrap();
        assert_eq!(matcher.find(b"a foooo b"), Some((2, 7)));
    }
}
