//! Values passed between pipeline stages
//!
//! Blocks and records carry the source bytes untouched. Nothing in the
//! pipeline decodes them, so input in any encoding with a single-byte `\n`
//! passes through unchanged.

use std::borrow::Cow;
use std::ops::Deref;

/// Zero or more complete lines of input.
///
/// Every block produced by the segmenter ends with `\n`. The one exception is
/// the terminal sentinel, which is empty and marks the end of the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBlock(Vec<u8>);

impl LineBlock {
    /// The empty end-of-stream marker
    pub fn sentinel() -> Self {
        Self(Vec::new())
    }

    /// Whether this block is the end-of-stream marker
    pub fn is_sentinel(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the block bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take ownership of the block bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for LineBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for LineBlock {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for LineBlock {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for LineBlock {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

/// A record tagged with its position among the records that passed filtering.
///
/// Indices are dense and start at 1. Workers that transform records must hand
/// back the index they received, even when the transformed text is empty,
/// otherwise the reassembler waits on the missing index until the input
/// closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRecord {
    /// Dense 1-based index assigned after filtering
    pub index: usize,
    /// Record bytes, or the result of transforming them
    pub text: Vec<u8>,
}

impl IndexedRecord {
    /// Create a record with the given index
    pub fn new<B: Into<Vec<u8>>>(index: usize, text: B) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Same index, different text
    pub fn with_text<B: Into<Vec<u8>>>(&self, text: B) -> Self {
        Self::new(self.index, text)
    }

    /// The record as text, with invalid UTF-8 replaced
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }
}
