//! Carpet: Terminal Coverage Annotation
//!
//! Overlays execution-status colors onto source bytes. Given the statement
//! blocks of a coverage run and the raw bytes of the file they came from,
//! Carpet produces a byte stream where executed and non-executed code are
//! visually distinguished, even when blocks overlap or span many lines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    CARPET Pipeline                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Profile ──► Blocks ──► Boundaries ──► SpanPainter ──► bytes     │
//! │                │             ▲              ▲                    │
//! │          FileCoverageStat    │          Palette / Shade          │
//! │                │      Function ranges                            │
//! │                ▼                                                 │
//! │        gating + footer (ReportRenderer)                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cover_carpet::{Block, PlainPalette, RenderConfig, ReportRenderer, SourceFile};
//!
//! let source = "fn main() {\n    run();\n}\n";
//! let blocks = vec![Block::new(10, 24, 1, 1).unwrap()];
//! let renderer = ReportRenderer::new(RenderConfig::default(), PlainPalette).unwrap();
//! let report = renderer.render_report(&[SourceFile::new("main.rs", source, blocks)]);
//! assert!((report.percent() - 100.0).abs() < f64::EPSILON);
//! ```

#![warn(missing_docs)]

mod block;
mod boundary;
mod config;
mod functions;
mod palette;
mod profile;
mod report;
mod result;
mod shade;
mod span;
mod stats;

pub use block::{Block, TextRange};
pub use boundary::{resolve_boundaries, BoundaryEvent, FLAT_RATIO};
pub use config::{ConfigValidationError, OverlapPolicy, RenderConfig, RenderConfigBuilder};
pub use functions::{select_ranges, FunctionLocator, FunctionSpan};
#[cfg(feature = "ansi")]
pub use palette::AnsiPalette;
pub use palette::{ColorToken, Palette, PlainPalette};
pub use profile::{
    parse_profiles, parse_profiles_file, CoverMode, LineIndex, Profile, ProfileBlock,
    ProfileParser,
};
pub use report::{FileFailure, FileOutcome, Report, ReportRenderer, SkipReason, SourceFile};
pub use result::{CarpetError, CarpetResult};
pub use shade::{shade_for, Shade, GREEN_SHADES, SHADE_COUNT};
pub use span::SpanPainter;
pub use stats::{coverage_percent, FileCoverageStat};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "ansi")]
    pub use super::AnsiPalette;
    pub use super::{
        parse_profiles, resolve_boundaries, Block, CarpetError, CarpetResult, ColorToken,
        FileCoverageStat, FunctionSpan, OverlapPolicy, Palette, PlainPalette, RenderConfig,
        Report, ReportRenderer, SourceFile, SpanPainter, TextRange,
    };
}
