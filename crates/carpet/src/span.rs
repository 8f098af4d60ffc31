//! Span Painting
//!
//! Walks boundary events against the raw bytes of one [`TextRange`] and
//! emits literal text interleaved with color tokens.
//!
//! Output is line-safe: while a color is open, every `\n` inside a literal
//! chunk is wrapped as `reset \n color`, so each line can be consumed on its
//! own (pagers, `grep`, `head`) without a color bleeding into the next.

use crate::block::TextRange;
use crate::boundary::BoundaryEvent;
use crate::config::OverlapPolicy;
use crate::palette::{ColorToken, Palette};
use crate::result::CarpetResult;
use crate::shade::shade_for;

/// Paints one text range at a time
#[derive(Debug, Clone, Copy)]
pub struct SpanPainter<P> {
    palette: P,
    shaded: bool,
    overlap: OverlapPolicy,
}

impl<P: Palette> SpanPainter<P> {
    /// Painter with a flat green for executed code
    #[must_use]
    pub const fn new(palette: P) -> Self {
        Self {
            palette,
            shaded: false,
            overlap: OverlapPolicy::LastOpened,
        }
    }

    /// Shade executed code by frequency
    #[must_use]
    pub const fn with_shades(mut self, shaded: bool) -> Self {
        self.shaded = shaded;
        self
    }

    /// Set the overlap policy
    #[must_use]
    pub const fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    /// Token for a start event
    fn start_token(&self, event: &BoundaryEvent) -> ColorToken {
        match (event.is_covered(), self.shaded) {
            (false, _) => ColorToken::Red,
            (true, false) => ColorToken::Green,
            (true, true) => ColorToken::Shade(shade_for(event.ratio)),
        }
    }

    /// Paint `range` of `source` into `out`
    ///
    /// `events` must be sorted as produced by
    /// [`resolve_boundaries`](crate::resolve_boundaries); events outside the
    /// range are ignored. Exactly one `\n` is appended after the range.
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::RangeOutOfBounds`](crate::CarpetError) if the
    /// range does not fit in `source`.
    pub fn paint(
        &self,
        source: &[u8],
        range: TextRange,
        events: &[BoundaryEvent],
        out: &mut Vec<u8>,
    ) -> CarpetResult<()> {
        range.slice(source)?;

        let mut cursor = range.begin;
        let mut active: Option<ColorToken> = None;
        let mut open: Vec<&BoundaryEvent> = Vec::new();

        for event in events.iter().filter(|e| range.admits(e.offset)) {
            if event.offset > cursor {
                self.write_chunk(&source[cursor..event.offset], active, out);
                cursor = event.offset;
            }

            let token = match self.overlap {
                OverlapPolicy::LastOpened => {
                    if event.is_start {
                        self.start_token(event)
                    } else {
                        ColorToken::Reset
                    }
                }
                OverlapPolicy::Innermost => {
                    if event.is_start {
                        open.push(event);
                    } else {
                        open.retain(|o| o.block != event.block);
                    }
                    innermost(&open).map_or(ColorToken::Reset, |o| self.start_token(o))
                }
            };

            out.extend_from_slice(self.palette.paint(token));
            active = (!token.is_reset()).then_some(token);
        }

        // A block may still be open when it runs past the end of the range
        self.write_chunk(&source[cursor..range.end], active, out);
        if active.is_some() {
            out.extend_from_slice(self.palette.paint(ColorToken::Reset));
        }
        out.push(b'\n');
        Ok(())
    }

    /// Write a literal chunk, re-balancing colors around line breaks
    fn write_chunk(&self, chunk: &[u8], active: Option<ColorToken>, out: &mut Vec<u8>) {
        let Some(color) = active else {
            out.extend_from_slice(chunk);
            return;
        };

        let reset = self.palette.paint(ColorToken::Reset);
        let color = self.palette.paint(color);
        let mut lines = chunk.split(|&b| b == b'\n');
        if let Some(first) = lines.next() {
            out.extend_from_slice(first);
        }
        for line in lines {
            out.extend_from_slice(reset);
            out.push(b'\n');
            out.extend_from_slice(color);
            out.extend_from_slice(line);
        }
    }
}

/// Most nested open block: greatest begin, then smallest end
fn innermost<'a>(open: &[&'a BoundaryEvent]) -> Option<&'a BoundaryEvent> {
    open.iter()
        .copied()
        .max_by(|a, b| {
            a.extent
                .begin
                .cmp(&b.extent.begin)
                .then_with(|| b.extent.end.cmp(&a.extent.end))
                .then_with(|| a.block.cmp(&b.block))
        })
}
