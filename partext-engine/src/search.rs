//! Literal substring search
//!
//! Record boundaries and the require/exclude filters are all literal
//! substring lookups. [`PatternSearch`] is the seam the partitioner and the
//! filterer depend on; [`StringSearcher`] is the Boyer-Moore-Horspool
//! implementation used by default.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;

/// Matching semantics for a literal pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Compare ASCII letters exactly; when false, ASCII case is folded
    pub case_sensitive: bool,
    /// Only report matches not surrounded by word characters
    pub whole_word: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
        }
    }
}

impl SearchOptions {
    /// Case-insensitive matching
    pub fn ignore_case() -> Self {
        Self {
            case_sensitive: false,
            ..Self::default()
        }
    }
}

/// Literal pattern search over raw bytes
pub trait PatternSearch: Send + Sync {
    /// The pattern as given by the caller
    fn pattern(&self) -> &str;

    /// Call `on_match` with the byte offset of every match at or after
    /// `start`, in ascending order. Returning `ControlFlow::Break` stops the
    /// search.
    fn search(
        &self,
        haystack: &[u8],
        start: usize,
        on_match: &mut dyn FnMut(usize) -> ControlFlow<()>,
    );

    /// Whether the pattern matches at exactly `pos`
    fn matches_at(&self, haystack: &[u8], pos: usize) -> bool;

    /// First match at or after `start`
    fn find(&self, haystack: &[u8], start: usize) -> Option<usize> {
        let mut found = None;
        self.search(haystack, start, &mut |pos| {
            found = Some(pos);
            ControlFlow::Break(())
        });
        found
    }

    /// Whether the pattern occurs anywhere in `haystack`
    fn contains(&self, haystack: &[u8]) -> bool {
        self.find(haystack, 0).is_some()
    }
}

/// Boyer-Moore-Horspool searcher for a single literal pattern.
///
/// Matches never overlap: after a hit the scan resumes behind it. Case
/// folding only touches ASCII letters, so input in any ASCII-compatible
/// encoding is searched byte for byte and never needs decoding.
#[derive(Debug, Clone)]
pub struct StringSearcher {
    pattern: String,
    needle: Vec<u8>,
    shift: [usize; 256],
    options: SearchOptions,
}

impl StringSearcher {
    /// Build a searcher for `pattern`
    pub fn new<S: Into<String>>(pattern: S, options: SearchOptions) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(EngineError::InvalidPattern {
                reason: "pattern is empty".to_string(),
            });
        }

        let needle: Vec<u8> = if options.case_sensitive {
            pattern.as_bytes().to_vec()
        } else {
            pattern.bytes().map(|b| b.to_ascii_lowercase()).collect()
        };

        let last = needle.len() - 1;
        let mut shift = [needle.len(); 256];
        for (i, &b) in needle[..last].iter().enumerate() {
            shift[b as usize] = last - i;
            if !options.case_sensitive {
                shift[b.to_ascii_uppercase() as usize] = last - i;
            }
        }

        Ok(Self {
            pattern,
            needle,
            shift,
            options,
        })
    }

    fn fold(&self, b: u8) -> u8 {
        if self.options.case_sensitive {
            b
        } else {
            b.to_ascii_lowercase()
        }
    }

    fn bytes_match(&self, hay: &[u8], pos: usize) -> bool {
        hay[pos..pos + self.needle.len()]
            .iter()
            .zip(&self.needle)
            .all(|(&h, &n)| self.fold(h) == n)
    }

    fn at_word_edges(&self, hay: &[u8], pos: usize) -> bool {
        let end = pos + self.needle.len();
        let before = pos == 0 || !is_word_byte(hay[pos - 1]);
        let after = end >= hay.len() || !is_word_byte(hay[end]);
        before && after
    }

    fn is_hit(&self, hay: &[u8], pos: usize) -> bool {
        self.bytes_match(hay, pos)
            && (!self.options.whole_word || self.at_word_edges(hay, pos))
    }

    /// Whether a full needle fits at `pos` without running off the end
    fn fits(&self, hay: &[u8], pos: usize) -> bool {
        pos <= hay.len() && hay.len() - pos >= self.needle.len()
    }
}

impl PatternSearch for StringSearcher {
    fn pattern(&self) -> &str {
        &self.pattern
    }

    fn search(
        &self,
        hay: &[u8],
        start: usize,
        on_match: &mut dyn FnMut(usize) -> ControlFlow<()>,
    ) {
        let len = self.needle.len();
        let last = len - 1;
        let mut pos = start;

        while self.fits(hay, pos) {
            if self.is_hit(hay, pos) {
                if on_match(pos).is_break() {
                    return;
                }
                pos += len;
                continue;
            }
            pos += self.shift[hay[pos + last] as usize];
        }
    }

    fn matches_at(&self, hay: &[u8], pos: usize) -> bool {
        self.fits(hay, pos) && self.is_hit(hay, pos)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_matches(searcher: &StringSearcher, hay: &str) -> Vec<usize> {
        let mut hits = Vec::new();
        searcher.search(hay.as_bytes(), 0, &mut |pos| {
            hits.push(pos);
            ControlFlow::Continue(())
        });
        hits
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let result = StringSearcher::new("", SearchOptions::default());
        assert!(matches!(result, Err(EngineError::InvalidPattern { .. })));
    }

    #[test]
    fn test_finds_every_occurrence() {
        let searcher = StringSearcher::new("A>", SearchOptions::default()).unwrap();
        assert_eq!(
            all_matches(&searcher, "A>rec1\nA>rec2\nA>rec3\n"),
            vec![0, 7, 14]
        );
    }

    #[test]
    fn test_matches_do_not_overlap() {
        let searcher = StringSearcher::new("aa", SearchOptions::default()).unwrap();
        assert_eq!(all_matches(&searcher, "aaaaa"), vec![0, 2]);
    }

    #[test]
    fn test_start_offset_skips_earlier_hits() {
        let searcher = StringSearcher::new("x", SearchOptions::default()).unwrap();
        assert_eq!(searcher.find(b"x-x-x", 1), Some(2));
        assert_eq!(searcher.find(b"x-x-x", 5), None);
        assert_eq!(searcher.find(b"x", 9), None);
    }

    #[test]
    fn test_start_near_usize_max() {
        let searcher = StringSearcher::new("xy", SearchOptions::default()).unwrap();
        assert_eq!(searcher.find(b"xy", usize::MAX), None);
        assert_eq!(searcher.find(b"xy", usize::MAX - 1), None);
        assert!(!searcher.matches_at(b"xy", usize::MAX));
    }

    #[test]
    fn test_case_folding() {
        let sensitive = StringSearcher::new("Rec", SearchOptions::default()).unwrap();
        let folded = StringSearcher::new("Rec", SearchOptions::ignore_case()).unwrap();

        assert!(!sensitive.contains(b"a REC here"));
        assert!(folded.contains(b"a REC here"));
        assert_eq!(all_matches(&folded, "rec REC rEc"), vec![0, 4, 8]);
    }

    #[test]
    fn test_whole_word() {
        let options = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        let searcher = StringSearcher::new("cat", options).unwrap();
        assert_eq!(all_matches(&searcher, "cat concat cat_ cat."), vec![0, 16]);
    }

    #[test]
    fn test_early_termination() {
        let searcher = StringSearcher::new("b", SearchOptions::default()).unwrap();
        let mut calls = 0;
        searcher.search(b"bbbb", 0, &mut |_| {
            calls += 1;
            ControlFlow::Break(())
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_multibyte_haystack_offsets_are_char_boundaries() {
        let searcher = StringSearcher::new("é>", SearchOptions::ignore_case()).unwrap();
        let hay = "ü é>one é>two";
        let hits = all_matches(&searcher, hay);
        assert_eq!(hits.len(), 2);
        for pos in hits {
            assert!(hay.is_char_boundary(pos));
            assert!(hay[pos..].starts_with("é>"));
        }
    }

    #[test]
    fn test_non_utf8_haystack() {
        let searcher = StringSearcher::new("A>", SearchOptions::ignore_case()).unwrap();
        let mut hits = Vec::new();
        searcher.search(b"a>caf\xe9\n\xffA>two\n", 0, &mut |pos| {
            hits.push(pos);
            ControlFlow::Continue(())
        });
        assert_eq!(hits, vec![0, 8]);
    }

    #[test]
    fn test_matches_at() {
        let searcher = StringSearcher::new("A>", SearchOptions::default()).unwrap();
        assert!(searcher.matches_at(b"A>rec", 0));
        assert!(!searcher.matches_at(b"xA>rec", 0));
        assert!(searcher.matches_at(b"xA>rec", 1));
        assert!(!searcher.matches_at(b"A", 0));
    }
}
