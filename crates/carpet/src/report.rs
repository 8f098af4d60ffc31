//! Coverage Report Rendering
//!
//! Drives the whole pipeline for a set of files:
//!
//! ```text
//! blocks ─► aggregator ─► gating ─► function filter ─► boundaries ─► painter
//!                │                                                     │
//!                └──────────── aggregate footer ◄──── per-file output ◄┘
//! ```
//!
//! A file that fails to render (for example a function filter with no
//! match) is recorded in [`Report::failures`] and contributes no bytes;
//! rendering continues with the next file.

use crate::block::{Block, TextRange};
use crate::boundary::resolve_boundaries;
use crate::config::RenderConfig;
use crate::functions::{select_ranges, FunctionSpan};
use crate::palette::{ColorToken, Palette};
use crate::result::{CarpetError, CarpetResult};
use crate::span::SpanPainter;
use crate::stats::FileCoverageStat;
use std::io::Write;
use tracing::{debug, debug_span, warn};

/// One file to render
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Display name (the name recorded in the coverage profile)
    pub name: String,
    /// Raw source bytes
    pub source: Vec<u8>,
    /// Coverage blocks for this file
    pub blocks: Vec<Block>,
    /// Function table, only consulted when a function filter is active
    pub functions: Vec<FunctionSpan>,
}

impl SourceFile {
    /// Create a file without a function table
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<Vec<u8>>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            blocks,
            functions: Vec::new(),
        }
    }

    /// Attach a function table
    #[must_use]
    pub fn with_functions(mut self, functions: Vec<FunctionSpan>) -> Self {
        self.functions = functions;
        self
    }
}

/// Why a file produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Name did not match the file filter
    NotSelected,
    /// Coverage above the configured minimum
    AboveMinCoverage,
}

/// Result of rendering one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// File rendered into `output`
    Rendered {
        /// Header, body and trailing blank line
        output: Vec<u8>,
        /// Statement counts of the file
        stat: FileCoverageStat,
    },
    /// File left out of the report
    Skipped {
        /// Why the file was left out
        reason: SkipReason,
        /// Statement counts of the file
        stat: FileCoverageStat,
    },
}

/// A file that failed to render
#[derive(Debug)]
pub struct FileFailure {
    /// Display name of the file
    pub name: String,
    /// What went wrong
    pub error: CarpetError,
}

/// Output of a full report run
#[derive(Debug, Default)]
pub struct Report {
    /// Concatenated per-file output plus footer
    pub output: Vec<u8>,
    /// Statement counts over every rendered file
    pub stat: FileCoverageStat,
    /// Names of rendered files, in order
    pub rendered: Vec<String>,
    /// Names of skipped files with the reason
    pub skipped: Vec<(String, SkipReason)>,
    /// Files that failed to render
    pub failures: Vec<FileFailure>,
}

impl Report {
    /// Aggregate coverage percentage over the rendered files
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.stat.percent()
    }

    /// Whether every file rendered or was skipped on purpose
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Write the report output
    ///
    /// # Errors
    /// Returns an I/O error if writing fails
    pub fn write_to<W: Write>(&self, mut writer: W) -> CarpetResult<()> {
        writer.write_all(&self.output)?;
        writer.flush()?;
        Ok(())
    }
}

/// Renders coverage for one or more files
#[derive(Debug, Clone)]
pub struct ReportRenderer<P> {
    config: RenderConfig,
    palette: P,
}

impl<P: Palette> ReportRenderer<P> {
    /// Create a renderer
    ///
    /// # Errors
    /// Returns [`CarpetError::Config`] if the configuration is invalid
    pub fn new(config: RenderConfig, palette: P) -> CarpetResult<Self> {
        config.ensure_valid()?;
        Ok(Self { config, palette })
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn painter(&self) -> SpanPainter<&P> {
        SpanPainter::new(&self.palette)
            .with_shades(self.config.shaded)
            .with_overlap(self.config.overlap)
    }

    /// Render one file
    ///
    /// # Errors
    ///
    /// - [`CarpetError::FunctionNotFound`] if a function filter is active and
    ///   none of its names exist in the file
    /// - [`CarpetError::RangeOutOfBounds`] if a function span or block does
    ///   not fit in the source
    pub fn render_file(&self, file: &SourceFile) -> CarpetResult<FileOutcome> {
        let stat = FileCoverageStat::from_blocks(&file.blocks);

        if !self.config.selects_file(&file.name) {
            return Ok(FileOutcome::Skipped {
                reason: SkipReason::NotSelected,
                stat,
            });
        }
        if self.config.exceeds_min_coverage(stat.percent()) {
            return Ok(FileOutcome::Skipped {
                reason: SkipReason::AboveMinCoverage,
                stat,
            });
        }

        let mut output = Vec::new();
        let title = format!("{} - {:.1}%", file.name, stat.percent());

        if self.config.summary_only {
            if self.config.filters_functions() {
                select_ranges(file.source.len(), &self.config.functions, &file.functions)?;
            }
            if self.config.header {
                self.write_line(&mut output, ColorToken::Yellow, &title);
            }
            return Ok(FileOutcome::Rendered { output, stat });
        }

        let body = self.render_body(file)?;
        if self.config.header {
            self.write_line(&mut output, ColorToken::Yellow, &title);
            let underline = "~".repeat(title.chars().count());
            self.write_line(&mut output, ColorToken::BrightBlack, &underline);
        }
        output.extend_from_slice(&body);
        output.push(b'\n');

        Ok(FileOutcome::Rendered { output, stat })
    }

    /// Annotated body of one file: every selected range, each newline-terminated
    ///
    /// # Errors
    /// See [`ReportRenderer::render_file`]
    pub fn render_body(&self, file: &SourceFile) -> CarpetResult<Vec<u8>> {
        let len = file.source.len();
        if let Some(block) = file.blocks.iter().find(|b| b.end() > len) {
            return Err(CarpetError::RangeOutOfBounds {
                begin: block.begin(),
                end: block.end(),
                len,
            });
        }

        let ranges: Vec<TextRange> = select_ranges(len, &self.config.functions, &file.functions)?;
        let events = resolve_boundaries(&file.blocks);
        let painter = self.painter();

        let mut body = Vec::with_capacity(len + len / 4);
        for range in ranges {
            painter.paint(&file.source, range, &events, &mut body)?;
        }
        Ok(body)
    }

    /// Render every file and the aggregate footer
    ///
    /// Never fails as a whole: per-file errors land in
    /// [`Report::failures`].
    pub fn render_report(&self, files: &[SourceFile]) -> Report {
        let _span = debug_span!("render_report", files = files.len()).entered();
        let mut report = Report::default();

        for file in files {
            match self.render_file(file) {
                Ok(FileOutcome::Rendered { output, stat }) => {
                    debug!(file = %file.name, percent = stat.percent(), "rendered file");
                    report.output.extend_from_slice(&output);
                    report.stat = report.stat + stat;
                    report.rendered.push(file.name.clone());
                }
                Ok(FileOutcome::Skipped { reason, stat }) => {
                    debug!(file = %file.name, percent = stat.percent(), ?reason, "skipped file");
                    report.skipped.push((file.name.clone(), reason));
                }
                Err(error) => {
                    warn!(file = %file.name, %error, "failed to render file");
                    report.failures.push(FileFailure {
                        name: file.name.clone(),
                        error,
                    });
                }
            }
        }

        if self.config.footer && !self.config.filters_functions() && !report.rendered.is_empty() {
            let footer = format!("Coverage: {:.1}% of statements", report.percent());
            self.write_line(&mut report.output, ColorToken::Yellow, &footer);
        }

        report
    }

    fn write_line(&self, out: &mut Vec<u8>, color: ColorToken, text: &str) {
        out.extend_from_slice(self.palette.paint(color));
        out.extend_from_slice(text.as_bytes());
        out.extend_from_slice(self.palette.paint(ColorToken::Reset));
        out.push(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PlainPalette;
    use pretty_assertions::assert_eq;

    fn block(begin: usize, end: usize, statements: u64, hits: u64) -> Block {
        Block::new(begin, end, statements, hits).unwrap()
    }

    fn plain(config: RenderConfig) -> ReportRenderer<PlainPalette> {
        ReportRenderer::new(config, PlainPalette).unwrap()
    }

    fn text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RenderConfig::builder().min_coverage(-1.0).build();
        assert!(matches!(
            ReportRenderer::new(config, PlainPalette),
            Err(CarpetError::Config { .. })
        ));
    }

    #[test]
    fn test_plain_file_layout() {
        let file = SourceFile::new("a.go", "x\ny", vec![block(0, 1, 1, 1), block(2, 3, 1, 0)]);
        let FileOutcome::Rendered { output, stat } = plain(RenderConfig::default()).render_file(&file).unwrap() else {
            panic!("expected rendered file");
        };
        assert_eq!(text(&output), "a.go - 50.0%\n~~~~~~~~~~~~\nx\ny\n\n");
        assert_eq!(stat.total_statements, 2);
    }

    #[test]
    fn test_summary_only() {
        let file = SourceFile::new("a.go", "x", vec![block(0, 1, 1, 1)]);
        let renderer = plain(RenderConfig::builder().summary_only(true).build());
        let report = renderer.render_report(&[file]);
        assert_eq!(text(&report.output), "a.go - 100.0%\nCoverage: 100.0% of statements\n");
    }

    #[test]
    fn test_summary_with_missing_function_fails() {
        let file = SourceFile::new("f.go", "x", vec![block(0, 1, 1, 1)])
            .with_functions(vec![FunctionSpan::new("present", 1, 2)]);
        let renderer = plain(
            RenderConfig::builder()
                .summary_only(true)
                .function("absent")
                .build(),
        );

        assert!(matches!(
            renderer.render_file(&file),
            Err(CarpetError::FunctionNotFound { .. })
        ));
        let report = renderer.render_report(&[file]);
        assert!(report.output.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_summary_with_present_function() {
        let file = SourceFile::new("f.go", "x", vec![block(0, 1, 1, 1)])
            .with_functions(vec![FunctionSpan::new("present", 1, 2)]);
        let renderer = plain(
            RenderConfig::builder()
                .summary_only(true)
                .function("present")
                .build(),
        );
        let report = renderer.render_report(&[file]);
        assert_eq!(text(&report.output), "f.go - 100.0%\n");
    }

    #[test]
    fn test_headers_off() {
        let file = SourceFile::new("a.go", "x", vec![]);
        let renderer = plain(RenderConfig::builder().header(false).footer(false).build());
        let report = renderer.render_report(&[file]);
        assert_eq!(text(&report.output), "x\n\n");
    }

    #[test]
    fn test_file_filter_skips() {
        let files = [
            SourceFile::new("pkg/one.go", "1", vec![block(0, 1, 1, 1)]),
            SourceFile::new("pkg/two.go", "2", vec![block(0, 1, 1, 0)]),
        ];
        let renderer = plain(RenderConfig::builder().file("two.go").build());
        let report = renderer.render_report(&files);
        assert_eq!(report.rendered, vec!["pkg/two.go"]);
        assert_eq!(
            report.skipped,
            vec![("pkg/one.go".to_string(), SkipReason::NotSelected)]
        );
        assert!(report.percent().abs() < f64::EPSILON);
    }

    #[test]
    fn test_function_filter_renders_each_range() {
        let source = "package p\nfunc a() {}\nfunc b() {}\n";
        let file = SourceFile::new("p.go", source, vec![]).with_functions(vec![
            FunctionSpan::new("a", 11, 22),
            FunctionSpan::new("b", 23, 34),
        ]);
        let renderer = plain(
            RenderConfig::builder()
                .function("b")
                .function("a")
                .header(false)
                .build(),
        );
        let report = renderer.render_report(&[file]);
        assert_eq!(text(&report.output), "func a() {}\nfunc b() {}\n\n");
        assert!(report.is_clean());
    }

    #[test]
    fn test_failure_recorded_and_rendering_continues() {
        let files = [
            SourceFile::new("bad.go", "x", vec![]),
            SourceFile::new("good.go", "y", vec![])
                .with_functions(vec![FunctionSpan::new("main", 1, 2)]),
        ];
        let renderer = plain(RenderConfig::builder().function("main").header(false).build());
        let report = renderer.render_report(&files);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "bad.go");
        assert!(report.failures[0].error.is_not_found());
        assert_eq!(report.rendered, vec!["good.go"]);
        assert_eq!(text(&report.output), "y\n\n");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_block_past_source_fails() {
        let file = SourceFile::new("a.go", "ab", vec![block(0, 5, 1, 1)]);
        assert!(matches!(
            plain(RenderConfig::default()).render_file(&file),
            Err(CarpetError::RangeOutOfBounds { len: 2, .. })
        ));
    }

    #[test]
    fn test_no_rendered_files_no_footer() {
        let renderer = plain(RenderConfig::default());
        let report = renderer.render_report(&[]);
        assert!(report.output.is_empty());
        assert!(report.rendered.is_empty());
    }

    #[test]
    fn test_write_to() {
        let file = SourceFile::new("a.go", "x", vec![]);
        let report = plain(RenderConfig::default()).render_report(&[file]);
        let mut sink = Vec::new();
        report.write_to(&mut sink).unwrap();
        assert_eq!(sink, report.output);
    }
}
