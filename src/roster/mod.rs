//! Roster loading and grouping
//!
//! A roster file is newline-delimited text. The first line is a header and is
//! discarded; every following non-empty line is a comma-separated record whose
//! first field is the student identifier and whose category field is picked by
//! a [`CategoryColumn`] policy.
//!
//! Both entry points, [`RosterLoader::load_blocking`] and [`RosterLoader::load`],
//! read the whole file and hand the content to [`parse`], so they always agree.
//!
//! # Example
//!
//! ```no_run
//! use roster::roster::{BufferSink, LoadOptions, RosterLoader};
//!
//! # async fn run() -> roster::error::Result<()> {
//! let loader = RosterLoader::new(LoadOptions::default());
//! let mut sink = BufferSink::new();
//! let report = loader.load("database.csv", &mut sink).await?;
//! println!("{} students", report.total());
//! # Ok(())
//! # }
//! ```

pub mod sink;

pub use sink::{BufferSink, StdoutSink, SummarySink, TracingSink};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Field separator within a record
pub const DELIMITER: char = ',';

/// Default bound on the asynchronous read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Column policy
// ============================================================================

/// Which field of a record names its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryColumn {
    /// The last comma-separated field
    #[default]
    Last,
    /// A fixed zero-based field index
    Index(usize),
}

impl CategoryColumn {
    /// Minimum number of fields a record needs under this policy
    pub fn min_fields(&self) -> usize {
        match self {
            Self::Last => 2,
            Self::Index(i) => (*i + 1).max(2),
        }
    }

    fn select<'a>(&self, fields: &[&'a str]) -> Option<&'a str> {
        match self {
            Self::Last => fields.last().copied(),
            Self::Index(i) => fields.get(*i).copied(),
        }
    }
}

impl fmt::Display for CategoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Last => write!(f, "last"),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

impl FromStr for CategoryColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("last") {
            return Ok(Self::Last);
        }
        match s.parse::<usize>() {
            Ok(0) => Err(Error::config(
                "category column 0 is the identifier column",
            )),
            Ok(i) => Ok(Self::Index(i)),
            Err(_) => Err(Error::config(format!(
                "invalid category column '{s}': expected 'last' or a field index"
            ))),
        }
    }
}

impl Serialize for CategoryColumn {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategoryColumn {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Identifiers sharing one category, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub category: String,
    pub identifiers: Vec<String>,
}

/// Identifiers grouped by category
///
/// Categories keep first-occurrence order and identifiers keep file order.
/// A category only exists once at least one identifier has been recorded for it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    groups: Vec<Group>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    skipped_lines: Vec<usize>,
}

impl PartialEq for Report {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups && self.skipped_lines == other.skipped_lines
    }
}

impl Eq for Report {}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, category: &str, identifier: &str) {
        let slot = match self.index.get(category) {
            Some(&slot) => slot,
            None => {
                self.groups.push(Group {
                    category: category.to_string(),
                    identifiers: Vec::new(),
                });
                let slot = self.groups.len() - 1;
                self.index.insert(category.to_string(), slot);
                slot
            }
        };
        self.groups[slot].identifiers.push(identifier.to_string());
    }

    /// Total number of identifiers across all categories
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.identifiers.len()).sum()
    }

    /// Number of data lines dropped as malformed
    pub fn skipped(&self) -> usize {
        self.skipped_lines.len()
    }

    /// 1-based file line numbers of the skipped data lines
    pub fn skipped_lines(&self) -> &[usize] {
        &self.skipped_lines
    }

    /// Identifiers recorded for `category`
    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.index
            .get(category)
            .map(|&slot| self.groups[slot].identifiers.as_slice())
    }

    /// Category names in first-occurrence order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.category.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Serialize the groups as a JSON object-like array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.groups)?)
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse roster content into a [`Report`]
///
/// Blank lines are ignored and the first non-blank line is dropped as the
/// header. Lines with too few fields, or with an empty identifier or category,
/// are skipped and recorded in [`Report::skipped_lines`].
pub fn parse(content: &str, column: &CategoryColumn) -> Report {
    let mut report = Report::new();
    let mut header_seen = false;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        let lineno = index + 1;

        let fields: Vec<&str> = line.split(DELIMITER).collect();
        let identifier = fields.first().map(|f| f.trim()).unwrap_or_default();
        let category = column.select(&fields).map(str::trim).unwrap_or_default();

        if fields.len() < column.min_fields() || identifier.is_empty() || category.is_empty() {
            tracing::warn!(
                line = lineno,
                fields = fields.len(),
                column = %column,
                "Skipping malformed roster line"
            );
            report.skipped_lines.push(lineno);
            continue;
        }

        report.push(category, identifier);
    }

    report
}

/// Write the human-readable summary of `report` to `sink`
pub fn summarize(report: &Report, sink: &mut dyn SummarySink) {
    sink.emit(&format!("Number of students: {}", report.total()));
    for group in report {
        sink.emit(&format!(
            "Number of students in {}: {}. List: {}",
            group.category,
            group.identifiers.len(),
            group.identifiers.join(", ")
        ));
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Options shared by both load entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub category_column: CategoryColumn,
    /// Upper bound on the asynchronous read
    pub read_timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            category_column: CategoryColumn::Last,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Reads roster files and groups their records
#[derive(Debug, Clone, Default)]
pub struct RosterLoader {
    options: LoadOptions,
}

impl RosterLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Load `path` on the calling thread
    pub fn load_blocking(&self, path: impl AsRef<Path>, sink: &mut dyn SummarySink) -> Result<Report> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
        Ok(self.finish(path, &content, sink))
    }

    /// Load `path` without blocking the runtime
    ///
    /// The read is bounded by [`LoadOptions::read_timeout`]; expiry is reported
    /// as [`Error::ResourceUnavailable`] like any other read failure.
    pub async fn load(&self, path: impl AsRef<Path>, sink: &mut dyn SummarySink) -> Result<Report> {
        let path = path.as_ref();
        let content = match tokio::time::timeout(
            self.options.read_timeout,
            tokio::fs::read_to_string(path),
        )
        .await
        {
            Ok(Ok(content)) => content,
            Ok(Err(e)) => return Err(unavailable(path, e)),
            Err(_) => {
                tracing::warn!(
                    path = %path.display(),
                    timeout_ms = self.options.read_timeout.as_millis() as u64,
                    "Roster read timed out"
                );
                return Err(Error::resource_unavailable(path, None));
            }
        };
        Ok(self.finish(path, &content, sink))
    }

    fn finish(&self, path: &Path, content: &str, sink: &mut dyn SummarySink) -> Report {
        let report = parse(content, &self.options.category_column);
        tracing::debug!(
            path = %path.display(),
            total = report.total(),
            categories = report.len(),
            skipped = report.skipped(),
            "Roster loaded"
        );
        summarize(&report, sink);
        report
    }
}

fn unavailable(path: &Path, source: std::io::Error) -> Error {
    tracing::debug!(path = %path.display(), error = %source, "Roster read failed");
    Error::resource_unavailable(path, Some(source))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "firstname,lastname,age,field\n\
                          Johann,Kerbrou,30,CS\n\
                          Guillaume,Salou,30,SWE\n\
                          Arielle,Salou,20,CS\n";

    #[test]
    fn test_parse_groups_by_last_field() {
        let report = parse(SAMPLE, &CategoryColumn::Last);

        assert_eq!(report.categories().collect::<Vec<_>>(), ["CS", "SWE"]);
        assert_eq!(report.get("CS").unwrap(), ["Johann", "Arielle"]);
        assert_eq!(report.get("SWE").unwrap(), ["Guillaume"]);
        assert_eq!(report.total(), 3);
        assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn test_parse_fixed_index_policy() {
        let content = "name,a,b,field,extra\nAda,x,y,Math,tail\nBob,x,y,Art,tail\n";
        let report = parse(content, &CategoryColumn::Index(3));

        assert_eq!(report.categories().collect::<Vec<_>>(), ["Math", "Art"]);
        assert_eq!(report.get("Math").unwrap(), ["Ada"]);

        let by_last = parse(content, &CategoryColumn::Last);
        assert_eq!(by_last.categories().collect::<Vec<_>>(), ["tail"]);
    }

    #[test]
    fn test_parse_header_only() {
        let report = parse("firstname,lastname,age,field\n", &CategoryColumn::Last);
        assert!(report.is_empty());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse("", &CategoryColumn::Last).is_empty());
        assert!(parse("   \n\n", &CategoryColumn::Last).is_empty());
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_crlf() {
        let content = "h1,h2\r\nAda,CS\r\n\r\n   \r\nBob,CS\r\n";
        let report = parse(content, &CategoryColumn::Last);

        assert_eq!(report.get("CS").unwrap(), ["Ada", "Bob"]);
        assert_eq!(report.skipped(), 0);
    }

    #[test]
    fn test_parse_trims_fields() {
        let report = parse("h\n  Ada , x ,  CS  \n", &CategoryColumn::Last);
        assert_eq!(report.get("CS").unwrap(), ["Ada"]);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let content = "firstname,lastname,age,field\n\
                       Johann,Kerbrou,30,CS\n\
                       lonely\n\
                       ,Salou,30,CS\n\
                       Arielle,Salou,20,\n\
                       Short,row\n";

        let last = parse(content, &CategoryColumn::Last);
        assert_eq!(last.total(), 2);
        assert_eq!(last.get("row").unwrap(), ["Short"]);
        assert_eq!(last.skipped(), 3);

        let fixed = parse(content, &CategoryColumn::Index(3));
        assert_eq!(fixed.total(), 1);
        assert_eq!(fixed.skipped(), 4);
        assert!(fixed.get("row").is_none());
    }

    #[test]
    fn test_skipped_line_numbers_count_from_file_start() {
        let content = "\n\n   \nfirstname,lastname,age,field\n\
                       Johann,Kerbrou,30,CS\n\
                       lonely\n\
                       \n\
                       Arielle,Salou,20,\n";

        let report = parse(content, &CategoryColumn::Last);
        assert_eq!(report.get("CS").unwrap(), ["Johann"]);
        assert_eq!(report.skipped_lines(), [6, 8]);
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn test_summarize_lines() {
        let report = parse(SAMPLE, &CategoryColumn::Last);
        let mut sink = BufferSink::new();
        summarize(&report, &mut sink);

        assert_eq!(
            sink.lines(),
            [
                "Number of students: 3",
                "Number of students in CS: 2. List: Johann, Arielle",
                "Number of students in SWE: 1. List: Guillaume",
            ]
        );
    }

    #[test]
    fn test_summarize_empty_report() {
        let mut sink = BufferSink::new();
        summarize(&Report::new(), &mut sink);
        assert_eq!(sink.lines(), ["Number of students: 0"]);
    }

    #[test]
    fn test_category_column_from_str() {
        assert_eq!("last".parse::<CategoryColumn>().unwrap(), CategoryColumn::Last);
        assert_eq!(" LAST ".parse::<CategoryColumn>().unwrap(), CategoryColumn::Last);
        assert_eq!("3".parse::<CategoryColumn>().unwrap(), CategoryColumn::Index(3));
        assert!("0".parse::<CategoryColumn>().is_err());
        assert!("fourth".parse::<CategoryColumn>().is_err());
    }

    #[test]
    fn test_category_column_min_fields() {
        assert_eq!(CategoryColumn::Last.min_fields(), 2);
        assert_eq!(CategoryColumn::Index(1).min_fields(), 2);
        assert_eq!(CategoryColumn::Index(3).min_fields(), 4);
    }

    #[test]
    fn test_report_to_json() {
        let report = parse(SAMPLE, &CategoryColumn::Last);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json[0]["category"], "CS");
        assert_eq!(json[0]["identifiers"][1], "Arielle");
        assert_eq!(json[1]["category"], "SWE");
    }

    #[test]
    fn test_load_blocking_missing_file() {
        let loader = RosterLoader::default();
        let mut sink = BufferSink::new();
        let result = loader.load_blocking("/definitely/not/here.csv", &mut sink);

        assert!(matches!(result, Err(Error::ResourceUnavailable { .. })));
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let loader = RosterLoader::default();
        let mut sink = BufferSink::new();
        let result = loader.load("/definitely/not/here.csv", &mut sink).await;

        assert!(matches!(result, Err(Error::ResourceUnavailable { .. })));
        assert!(sink.lines().is_empty());
    }
}
