//! Cover Profile Reader
//!
//! Reads the line-oriented cover profile written by `go test -coverprofile`
//! and turns its line:column positions into byte-offset [`Block`]s.
//!
//! ## Format
//!
//! ```text
//! mode: set|count|atomic
//! <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStmt> <count>
//! ```
//!
//! Lines and columns are 1-based; columns count bytes.

use crate::block::Block;
use crate::result::{CarpetError, CarpetResult};
use crate::stats::FileCoverageStat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const RECORD_PATTERN: &str = r"^(.+):([0-9]+)\.([0-9]+),([0-9]+)\.([0-9]+) ([0-9]+) ([0-9]+)$";

/// How the counts in a profile were collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverMode {
    /// Counts are 0 or 1
    Set,
    /// Counts are execution counts
    Count,
    /// Execution counts collected atomically
    Atomic,
}

impl CoverMode {
    /// Parse a mode name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "set" => Some(Self::Set),
            "count" => Some(Self::Count),
            "atomic" => Some(Self::Atomic),
            _ => None,
        }
    }

    /// Mode name as written in the profile
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Count => "count",
            Self::Atomic => "atomic",
        }
    }

    /// Combine two counts recorded for the same block
    fn merge(self, a: u64, b: u64) -> u64 {
        match self {
            Self::Set => u64::from(a > 0 || b > 0),
            Self::Count | Self::Atomic => a.saturating_add(b),
        }
    }
}

/// A block as recorded in the profile, before offset resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileBlock {
    /// 1-based start line
    pub start_line: usize,
    /// 1-based start byte column
    pub start_col: usize,
    /// 1-based end line
    pub end_line: usize,
    /// 1-based end byte column (exclusive)
    pub end_col: usize,
    /// Statements in the block
    pub statements: u64,
    /// Execution count
    pub count: u64,
}

impl ProfileBlock {
    fn position(&self) -> (usize, usize, usize, usize) {
        (self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

/// Coverage for one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// File name as recorded by the test run
    pub file_name: String,
    /// Collection mode
    pub mode: CoverMode,
    /// Blocks sorted by start position
    pub blocks: Vec<ProfileBlock>,
}

impl Profile {
    /// Resolve line:column positions against `source`
    ///
    /// # Errors
    ///
    /// - [`CarpetError::PositionOutOfBounds`] if a position is past the source
    /// - [`CarpetError::InvalidBlock`] if a block resolves to an empty range
    pub fn resolve_blocks(&self, source: &[u8]) -> CarpetResult<Vec<Block>> {
        let index = LineIndex::new(source);
        self.blocks
            .iter()
            .map(|b| {
                let begin = index.offset(b.start_line, b.start_col)?;
                let end = index.offset(b.end_line, b.end_col)?;
                Block::new(begin, end, b.statements, b.count)
            })
            .collect()
    }

    /// Statement counts, no source needed
    #[must_use]
    pub fn stat(&self) -> FileCoverageStat {
        self.blocks
            .iter()
            .fold(FileCoverageStat::default(), |stat, b| FileCoverageStat {
                covered_statements: stat.covered_statements
                    + if b.count > 0 { b.statements } else { 0 },
                total_statements: stat.total_statements + b.statements,
            })
    }
}

/// Start offset of every line in a source
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Index the lines of `source`
    #[must_use]
    pub fn new(source: &[u8]) -> Self {
        let starts = std::iter::once(0)
            .chain(
                source
                    .iter()
                    .enumerate()
                    .filter(|&(_, &b)| b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            starts,
            len: source.len(),
        }
    }

    /// Number of lines (a trailing newline opens an empty last line)
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Byte offset of a 1-based line and byte column
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::PositionOutOfBounds`] for line or column 0, a
    /// line past the last, or an offset past the end of the source.
    pub fn offset(&self, line: usize, col: usize) -> CarpetResult<usize> {
        let out_of_bounds = CarpetError::PositionOutOfBounds { line, col };
        if col == 0 {
            return Err(out_of_bounds);
        }
        let start = line
            .checked_sub(1)
            .and_then(|i| self.starts.get(i))
            .ok_or(CarpetError::PositionOutOfBounds { line, col })?;
        start
            .checked_add(col - 1)
            .filter(|&offset| offset <= self.len)
            .ok_or(out_of_bounds)
    }
}

/// Parser for cover profiles
#[derive(Debug, Clone)]
pub struct ProfileParser {
    record: Regex,
}

impl ProfileParser {
    /// Create a parser
    ///
    /// # Errors
    /// Returns error if the record pattern fails to compile
    pub fn new() -> CarpetResult<Self> {
        Ok(Self {
            record: Regex::new(RECORD_PATTERN)?,
        })
    }

    /// Parse a whole profile
    ///
    /// Files come back sorted by name. Records for the same position are
    /// merged according to the profile mode.
    ///
    /// # Errors
    ///
    /// Returns [`CarpetError::ProfileParse`] with the 1-based line number of
    /// the first malformed line.
    pub fn parse(&self, input: &str) -> CarpetResult<Vec<Profile>> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim_end()))
            .filter(|(_, line)| !line.is_empty());

        let (mode_line, first) = lines
            .next()
            .ok_or_else(|| CarpetError::profile_parse(1, "missing mode line"))?;
        let mode = first
            .strip_prefix("mode: ")
            .and_then(CoverMode::from_name)
            .ok_or_else(|| CarpetError::profile_parse(mode_line, format!("bad mode line: {first}")))?;

        let mut files: BTreeMap<String, Vec<(usize, ProfileBlock)>> = BTreeMap::new();
        for (number, line) in lines {
            let (file_name, block) = self.parse_record(number, line)?;
            files.entry(file_name).or_default().push((number, block));
        }

        files
            .into_iter()
            .map(|(file_name, records)| {
                Ok(Profile {
                    blocks: merge_blocks(mode, records)?,
                    file_name,
                    mode,
                })
            })
            .collect()
    }

    fn parse_record(&self, number: usize, line: &str) -> CarpetResult<(String, ProfileBlock)> {
        let caps = self
            .record
            .captures(line)
            .ok_or_else(|| CarpetError::profile_parse(number, format!("bad record: {line}")))?;

        let field = |i: usize| -> CarpetResult<u64> {
            caps[i]
                .parse::<u64>()
                .map_err(|e| CarpetError::profile_parse(number, format!("bad number {}: {e}", &caps[i])))
        };
        let position = |i: usize| -> CarpetResult<usize> {
            usize::try_from(field(i)?)
                .map_err(|e| CarpetError::profile_parse(number, e.to_string()))
        };

        let block = ProfileBlock {
            start_line: position(2)?,
            start_col: position(3)?,
            end_line: position(4)?,
            end_col: position(5)?,
            statements: field(6)?,
            count: field(7)?,
        };
        Ok((caps[1].to_string(), block))
    }
}

/// Sort blocks by position and merge repeated records
fn merge_blocks(mode: CoverMode, mut records: Vec<(usize, ProfileBlock)>) -> CarpetResult<Vec<ProfileBlock>> {
    records.sort_by_key(|(_, block)| block.position());

    let mut merged: Vec<ProfileBlock> = Vec::with_capacity(records.len());
    for (number, block) in records {
        match merged.last_mut() {
            Some(last) if last.position() == block.position() => {
                if last.statements != block.statements {
                    return Err(CarpetError::profile_parse(
                        number,
                        format!(
                            "inconsistent statement count: changed from {} to {}",
                            last.statements, block.statements
                        ),
                    ));
                }
                last.count = mode.merge(last.count, block.count);
            }
            _ => merged.push(block),
        }
    }
    Ok(merged)
}

/// Parse a cover profile
///
/// # Errors
/// See [`ProfileParser::parse`]
pub fn parse_profiles(input: &str) -> CarpetResult<Vec<Profile>> {
    ProfileParser::new()?.parse(input)
}

/// Read and parse a cover profile from disk
///
/// # Errors
/// Returns an I/O error if the file cannot be read, otherwise see
/// [`ProfileParser::parse`]
pub fn parse_profiles_file(path: impl AsRef<Path>) -> CarpetResult<Vec<Profile>> {
    let content = std::fs::read_to_string(path)?;
    parse_profiles(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = "mode: count
pkg/b.go:3.10,5.2 2 4
pkg/a.go:7.1,7.20 1 0
pkg/a.go:2.5,4.3 3 1
";

    #[test]
    fn test_parse_groups_and_sorts() {
        let profiles = parse_profiles(PROFILE).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].file_name, "pkg/a.go");
        assert_eq!(profiles[1].file_name, "pkg/b.go");
        assert_eq!(profiles[0].mode, CoverMode::Count);
        assert_eq!(
            profiles[0].blocks[0],
            ProfileBlock {
                start_line: 2,
                start_col: 5,
                end_line: 4,
                end_col: 3,
                statements: 3,
                count: 1
            }
        );
        assert_eq!(profiles[0].blocks[1].start_line, 7);
    }

    #[test]
    fn test_count_mode_adds_repeats() {
        let input = "mode: count\na.go:1.1,1.5 1 2\na.go:1.1,1.5 1 3\n";
        let profiles = parse_profiles(input).unwrap();
        assert_eq!(profiles[0].blocks.len(), 1);
        assert_eq!(profiles[0].blocks[0].count, 5);
    }

    #[test]
    fn test_set_mode_ors_repeats() {
        let input = "mode: set\na.go:1.1,1.5 1 0\na.go:1.1,1.5 1 1\na.go:1.1,1.5 1 1\n";
        let profiles = parse_profiles(input).unwrap();
        assert_eq!(profiles[0].blocks[0].count, 1);
    }

    #[test]
    fn test_inconsistent_statements() {
        let input = "mode: atomic\na.go:1.1,1.5 1 2\na.go:1.1,1.5 2 3\n";
        let err = parse_profiles(input).unwrap_err();
        assert!(matches!(err, CarpetError::ProfileParse { line: 3, .. }));
        assert!(err.to_string().contains("inconsistent statement count"));
    }

    #[test]
    fn test_bad_mode_line() {
        let err = parse_profiles("a.go:1.1,1.5 1 2\n").unwrap_err();
        assert!(matches!(err, CarpetError::ProfileParse { line: 1, .. }));
        assert!(parse_profiles("mode: fast\n").is_err());
        assert!(parse_profiles("").is_err());
    }

    #[test]
    fn test_bad_record_reports_line() {
        let err = parse_profiles("mode: set\na.go:1.1,1.5 1 1\ngarbage\n").unwrap_err();
        assert!(matches!(err, CarpetError::ProfileParse { line: 3, .. }));
    }

    #[test]
    fn test_file_names_with_colons() {
        let profiles = parse_profiles("mode: set\nC:/src/a.go:1.1,1.2 1 1\n").unwrap();
        assert_eq!(profiles[0].file_name, "C:/src/a.go");
    }

    #[test]
    fn test_line_index_offsets() {
        let index = LineIndex::new(b"ab\ncde\n");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.offset(1, 1).unwrap(), 0);
        assert_eq!(index.offset(2, 1).unwrap(), 3);
        assert_eq!(index.offset(2, 4).unwrap(), 6);
        assert_eq!(index.offset(3, 1).unwrap(), 7);
        assert!(index.offset(3, 2).is_err());
        assert!(index.offset(4, 1).is_err());
        assert!(index.offset(0, 1).is_err());
        assert!(index.offset(1, 0).is_err());
    }

    #[test]
    fn test_line_index_huge_column() {
        let index = LineIndex::new(b"ab\ncd");
        assert!(matches!(
            index.offset(2, usize::MAX),
            Err(CarpetError::PositionOutOfBounds { line: 2, .. })
        ));
    }

    #[test]
    fn test_resolve_huge_column_from_record() {
        let record = format!("mode: set\nf.go:2.1,2.{} 1 1\n", usize::MAX);
        let profiles = parse_profiles(&record).unwrap();
        assert!(matches!(
            profiles[0].resolve_blocks(b"ab\ncd"),
            Err(CarpetError::PositionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_resolve_blocks() {
        let source = b"1 line\n123 green 456\n3 line red and other";
        let profiles = parse_profiles("mode: set\nf.go:2.5,2.10 1 1\nf.go:3.8,3.11 1 0\n").unwrap();
        let blocks = profiles[0].resolve_blocks(source).unwrap();
        assert_eq!(&source[blocks[0].begin()..blocks[0].end()], b"green");
        assert_eq!(&source[blocks[1].begin()..blocks[1].end()], b"red");
        assert!(blocks[0].is_covered());
        assert!(!blocks[1].is_covered());
    }

    #[test]
    fn test_resolve_rejects_positions_past_source() {
        let profiles = parse_profiles("mode: set\nf.go:1.1,9.1 1 1\n").unwrap();
        assert!(matches!(
            profiles[0].resolve_blocks(b"short"),
            Err(CarpetError::PositionOutOfBounds { line: 9, col: 1 })
        ));
    }

    #[test]
    fn test_profile_stat() {
        let profiles = parse_profiles(PROFILE).unwrap();
        let stat = profiles[0].stat();
        assert_eq!(stat.covered_statements, 3);
        assert_eq!(stat.total_statements, 4);
    }

    #[test]
    fn test_parse_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PROFILE.as_bytes()).unwrap();
        let profiles = parse_profiles_file(file.path()).unwrap();
        assert_eq!(profiles.len(), 2);

        assert!(matches!(
            parse_profiles_file(file.path().with_extension("missing")),
            Err(CarpetError::Io(_))
        ));
    }
}
