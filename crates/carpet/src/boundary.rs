//! Boundary Resolution
//!
//! Flattens a set of possibly-overlapping blocks into an ordered sequence of
//! color-change events. Every block yields one start event at its begin
//! offset and one end event at its end offset.
//!
//! # Ordering
//!
//! Events sort by offset. At equal offsets end events come before start
//! events, so a block closing exactly where another opens never leaves a
//! one-byte gap in the wrong color. Among starts at the same offset the
//! enclosing block opens last; among ends at the same offset the nested
//! block closes first. Block index breaks any remaining tie.

use crate::block::{Block, TextRange};
use std::cmp::Ordering;

/// Ratio assigned to every covered start when no block ran more than once
pub const FLAT_RATIO: f64 = 0.8;

/// A single color-change instruction derived from a block edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryEvent {
    /// Byte offset in the source
    pub offset: usize,
    /// Start (true) or end (false) of a block
    pub is_start: bool,
    /// Normalized execution frequency in [0, 1]; 0 for end events
    pub ratio: f64,
    /// Execution count of the block; 0 for end events
    pub hits: u64,
    /// Index of the producing block in the resolver input
    pub block: usize,
    /// Byte extent of the producing block
    pub extent: TextRange,
}

impl BoundaryEvent {
    /// Whether this start event opens an executed block
    #[inline]
    #[must_use]
    pub const fn is_covered(&self) -> bool {
        self.hits > 0
    }

    fn cmp_order(&self, other: &Self) -> Ordering {
        self.offset
            .cmp(&other.offset)
            .then_with(|| self.is_start.cmp(&other.is_start))
            .then_with(|| {
                if self.is_start {
                    self.extent.end.cmp(&other.extent.end)
                } else {
                    other.extent.begin.cmp(&self.extent.begin)
                }
            })
            .then_with(|| self.block.cmp(&other.block))
    }
}

/// Heat normalisation over the hit counts of one file
#[derive(Debug, Clone, Copy)]
struct Heat {
    max: u64,
    divisor: f64,
}

impl Heat {
    fn new(blocks: &[Block]) -> Self {
        let max = blocks.iter().map(Block::hits).max().unwrap_or(0);
        Self {
            max,
            divisor: (max as f64).ln(),
        }
    }

    fn ratio(self, hits: u64) -> f64 {
        if self.max <= 1 {
            FLAT_RATIO
        } else if hits > 0 {
            (hits as f64).ln() / self.divisor
        } else {
            0.0
        }
    }
}

/// Resolve blocks into sorted boundary events
///
/// The result is independent of the order of `blocks` except for the
/// `block` index each event carries.
#[must_use]
pub fn resolve_boundaries(blocks: &[Block]) -> Vec<BoundaryEvent> {
    let heat = Heat::new(blocks);
    let mut events = Vec::with_capacity(blocks.len() * 2);

    for (index, block) in blocks.iter().enumerate() {
        events.push(BoundaryEvent {
            offset: block.begin(),
            is_start: true,
            ratio: heat.ratio(block.hits()),
            hits: block.hits(),
            block: index,
            extent: block.extent(),
        });
        events.push(BoundaryEvent {
            offset: block.end(),
            is_start: false,
            ratio: 0.0,
            hits: 0,
            block: index,
            extent: block.extent(),
        });
    }

    events.sort_by(BoundaryEvent::cmp_order);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(begin: usize, end: usize, hits: u64) -> Block {
        Block::new(begin, end, 1, hits).unwrap()
    }

    fn shape(events: &[BoundaryEvent]) -> Vec<(usize, bool, usize)> {
        events
            .iter()
            .map(|e| (e.offset, e.is_start, e.block))
            .collect()
    }

    #[test]
    fn test_empty_input_yields_no_events() {
        assert!(resolve_boundaries(&[]).is_empty());
    }

    #[test]
    fn test_each_block_yields_start_and_end() {
        let events = resolve_boundaries(&[block(20, 30, 0), block(2, 8, 1)]);
        assert_eq!(
            shape(&events),
            vec![(2, true, 1), (8, false, 1), (20, true, 0), (30, false, 0)]
        );
    }

    #[test]
    fn test_end_precedes_start_at_same_offset() {
        let events = resolve_boundaries(&[block(5, 10, 1), block(0, 5, 1)]);
        assert_eq!(
            shape(&events),
            vec![(0, true, 1), (5, false, 1), (5, true, 0), (10, false, 0)]
        );
    }

    #[test]
    fn test_enclosing_block_opens_last() {
        // outer listed first and last: order must not depend on input
        for blocks in [
            vec![block(0, 20, 1), block(0, 5, 0)],
            vec![block(0, 5, 0), block(0, 20, 1)],
        ] {
            let events = resolve_boundaries(&blocks);
            let starts: Vec<_> = events.iter().filter(|e| e.is_start).collect();
            assert_eq!(starts[0].extent, TextRange::new(0, 5));
            assert_eq!(starts[1].extent, TextRange::new(0, 20));
        }
    }

    #[test]
    fn test_nested_block_closes_first() {
        let events = resolve_boundaries(&[block(0, 10, 1), block(4, 10, 1)]);
        let ends: Vec<_> = events.iter().filter(|e| !e.is_start).collect();
        assert_eq!(ends[0].extent, TextRange::new(4, 10));
        assert_eq!(ends[1].extent, TextRange::new(0, 10));
    }

    #[test]
    fn test_flat_ratio_when_max_is_one() {
        let events = resolve_boundaries(&[block(0, 1, 1), block(1, 2, 0)]);
        for event in events.iter().filter(|e| e.is_start) {
            assert!((event.ratio - FLAT_RATIO).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_log_ratio_for_counts() {
        let events = resolve_boundaries(&[block(0, 1, 100), block(1, 2, 10), block(2, 3, 0)]);
        let ratio = |b: usize| {
            events
                .iter()
                .find(|e| e.is_start && e.block == b)
                .map(|e| e.ratio)
                .unwrap()
        };
        assert!((ratio(0) - 1.0).abs() < 1e-12);
        assert!((ratio(1) - 0.5).abs() < 1e-12);
        assert!(ratio(2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_end_events_carry_no_hits() {
        let events = resolve_boundaries(&[block(0, 3, 9)]);
        let end = events.iter().find(|e| !e.is_start).unwrap();
        assert_eq!(end.hits, 0);
        assert!(!end.is_covered());
        assert!(events[0].is_covered());
    }
}
