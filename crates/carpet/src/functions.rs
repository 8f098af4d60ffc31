//! Function-Range Filtering
//!
//! Narrows rendering to the byte ranges of caller-named functions. Function
//! positions come from an external language-aware parser through
//! [`FunctionLocator`]; positions are 1-based (the first byte of the file is
//! position 1), so every span shifts by one byte when turned into a
//! [`TextRange`].

use crate::block::TextRange;
use crate::result::{CarpetError, CarpetResult};
use serde::{Deserialize, Serialize};

/// One function declaration as reported by a parser
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSpan {
    /// Function name
    pub name: String,
    /// 1-based position of the first byte
    pub begin: usize,
    /// 1-based position one past the last byte
    pub end: usize,
}

impl FunctionSpan {
    /// Create a span
    #[must_use]
    pub fn new(name: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            begin,
            end,
        }
    }

    /// Zero-based byte range of the function
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::RangeOutOfBounds`] if the span is inverted,
    /// starts at position 0, or extends past `source_len`.
    pub fn to_range(&self, source_len: usize) -> CarpetResult<TextRange> {
        let out_of_bounds = || CarpetError::RangeOutOfBounds {
            begin: self.begin.saturating_sub(1),
            end: self.end.saturating_sub(1),
            len: source_len,
        };
        let begin = self.begin.checked_sub(1).ok_or_else(out_of_bounds)?;
        let end = self.end.checked_sub(1).ok_or_else(out_of_bounds)?;
        if begin > end || end > source_len {
            return Err(out_of_bounds());
        }
        Ok(TextRange::new(begin, end))
    }
}

/// Source of function declarations for a file
pub trait FunctionLocator {
    /// All functions in `source`, in declaration order
    ///
    /// # Errors
    ///
    /// Implementations fail when the source cannot be parsed.
    fn locate(&self, source: &[u8]) -> CarpetResult<Vec<FunctionSpan>>;
}

/// A precomputed function table
impl FunctionLocator for [FunctionSpan] {
    fn locate(&self, _source: &[u8]) -> CarpetResult<Vec<FunctionSpan>> {
        Ok(self.to_vec())
    }
}

impl FunctionLocator for Vec<FunctionSpan> {
    fn locate(&self, source: &[u8]) -> CarpetResult<Vec<FunctionSpan>> {
        self.as_slice().locate(source)
    }
}

/// Select the ranges to render
///
/// An empty `requested` list selects the whole source. Otherwise every
/// function in `functions` whose name is requested yields one range, in
/// declaration order.
///
/// # Errors
///
/// - [`CarpetError::FunctionNotFound`] if no requested name matches
/// - [`CarpetError::RangeOutOfBounds`] if a matched span does not fit
pub fn select_ranges(
    source_len: usize,
    requested: &[String],
    functions: &[FunctionSpan],
) -> CarpetResult<Vec<TextRange>> {
    if requested.is_empty() {
        return Ok(vec![TextRange::whole(source_len)]);
    }

    let ranges = functions
        .iter()
        .filter(|function| requested.iter().any(|name| *name == function.name))
        .map(|function| function.to_range(source_len))
        .collect::<CarpetResult<Vec<_>>>()?;

    if ranges.is_empty() {
        return Err(CarpetError::FunctionNotFound {
            requested: requested.to_vec(),
        });
    }
    Ok(ranges)
}
