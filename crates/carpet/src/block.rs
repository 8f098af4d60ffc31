//! Statement Blocks and Text Ranges
//!
//! A [`Block`] is one statement region from a coverage run: a half-open byte
//! range `[begin, end)` with the number of statements it holds and how many
//! times it executed. A [`TextRange`] is a contiguous byte span selected for
//! rendering (a whole file, or one function).

use crate::result::{CarpetError, CarpetResult};

/// One statement region with its execution count
///
/// Construction enforces `begin < end`, so a `Block` is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    begin: usize,
    end: usize,
    statements: u64,
    hits: u64,
}

impl Block {
    /// Create a block over `[begin, end)`
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::InvalidBlock`] when `begin >= end`.
    pub fn new(begin: usize, end: usize, statements: u64, hits: u64) -> CarpetResult<Self> {
        if begin >= end {
            return Err(CarpetError::InvalidBlock { begin, end });
        }
        Ok(Self {
            begin,
            end,
            statements,
            hits,
        })
    }

    /// Begin offset (inclusive)
    #[inline]
    #[must_use]
    pub const fn begin(&self) -> usize {
        self.begin
    }

    /// End offset (exclusive)
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of statements in the block
    #[inline]
    #[must_use]
    pub const fn statements(&self) -> u64 {
        self.statements
    }

    /// Execution count
    #[inline]
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Whether the block executed at least once
    #[inline]
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.hits > 0
    }

    /// Byte extent of the block
    #[inline]
    #[must_use]
    pub const fn extent(&self) -> TextRange {
        TextRange::new(self.begin, self.end)
    }
}

/// A contiguous byte span `[begin, end)` selected for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    /// Begin offset (inclusive)
    pub begin: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl TextRange {
    /// Create a range
    #[inline]
    #[must_use]
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Range covering a whole source of `len` bytes
    #[inline]
    #[must_use]
    pub const fn whole(len: usize) -> Self {
        Self { begin: 0, end: len }
    }

    /// Length in bytes
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    /// Whether the range holds no bytes
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an event at `offset` belongs to this range
    ///
    /// Both ends are inclusive: a block closing exactly at `end` still
    /// closes inside the range.
    #[inline]
    #[must_use]
    pub const fn admits(&self, offset: usize) -> bool {
        offset >= self.begin && offset <= self.end
    }

    /// Borrow the bytes of this range from `source`
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::RangeOutOfBounds`] if the range is inverted or
    /// extends past the end of `source`.
    pub fn slice<'a>(&self, source: &'a [u8]) -> CarpetResult<&'a [u8]> {
        source
            .get(self.begin..self.end)
            .ok_or(CarpetError::RangeOutOfBounds {
                begin: self.begin,
                end: self.end,
                len: source.len(),
            })
    }
}
