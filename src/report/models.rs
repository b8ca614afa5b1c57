/*!
 * Models for the JSON coverage summaries produced by Istanbul-style
 * reporters (`coverage-summary.json`, optionally enriched with the
 * `statementMap`/`s` detail of `coverage-final.json`).
 *
 * An overview of the models and their relationships:
 * - A [`CoverageSnapshot`] is one test run. It holds a reserved `total`
 *   entry with the whole-project aggregate and one [`FileCoverage`] per
 *   source file, keyed by path.
 * - A [`FileCoverage`] carries the four summary metrics. Only `lines` is
 *   required; the others are kept when the reporter emits them.
 * - Line-level detail is optional. `statementMap` maps a statement id to its
 *   [`StatementLocation`] and `s` maps the same id to a hit count, where 0
 *   means the statement never ran.
 *
 * Reporters add keys of their own (`branchesTrue`, `fnMap`, `b`, ...). The
 * models ignore them, but a parsed snapshot keeps its source document so the
 * history files are exact copies.
 *
 * File and statement order is kept exactly as it appears in the document.
 * Downstream consumers (top movers, uncovered line ranges) rely on it for
 * tie-breaking.
 */

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the whole-project aggregate entry in a snapshot.
pub const TOTAL_KEY: &str = "total";

/// A complete coverage measurement for one test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSnapshot {
    /// The aggregate entry, stored under [`TOTAL_KEY`].
    pub total: FileCoverage,

    /// Every other key of the document, in document order.
    #[serde(flatten)]
    pub files: IndexMap<String, FileCoverage>,

    /// The document this snapshot was parsed from, keys the models don't name
    /// included. Saving a snapshot writes this back unchanged. Set by
    /// [`crate::parsers::parse_coverage_summary`]; callers that edit `total`
    /// or `files` directly must clear it.
    #[serde(skip)]
    pub source: Option<Value>,
}

/// Snapshots are equal when their coverage is; the source document is not
/// compared.
impl PartialEq for CoverageSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total && self.files == other.files
    }
}

impl CoverageSnapshot {
    pub fn new(total: FileCoverage) -> Self {
        Self {
            total,
            files: IndexMap::new(),
            source: None,
        }
    }

    pub fn with_file(mut self, path: &str, coverage: FileCoverage) -> Self {
        self.files.insert(path.to_string(), coverage);
        self.source = None;
        self
    }

    /// Line coverage of the aggregate entry.
    pub fn line_pct(&self) -> f64 {
        self.total.lines.pct
    }

    pub fn file(&self, path: &str) -> Option<&FileCoverage> {
        self.files.get(path)
    }
}

/// Coverage of a single file, or of the project when used as the aggregate.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    pub lines: CoverageMetric,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<CoverageMetric>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<CoverageMetric>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functions: Option<CoverageMetric>,

    /// Statement id -> source location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_map: Option<IndexMap<String, StatementLocation>>,

    /// Statement id -> number of times the statement ran.
    #[serde(default, rename = "s", skip_serializing_if = "Option::is_none")]
    pub statement_hits: Option<IndexMap<String, u64>>,
}

impl FileCoverage {
    /// A summary-only entry with the given line coverage.
    pub fn from_line_pct(pct: f64) -> Self {
        Self {
            lines: CoverageMetric::from_pct(pct),
            statements: None,
            branches: None,
            functions: None,
            statement_map: None,
            statement_hits: None,
        }
    }

    /// Number of times statement `id` ran. A statement with no recorded
    /// count never ran.
    pub fn hits_for(&self, id: &str) -> u64 {
        self.statement_hits
            .as_ref()
            .and_then(|hits| hits.get(id).copied())
            .unwrap_or(0)
    }

    /// Iterates the locations of statements that never ran, in
    /// `statementMap` order.
    pub fn uncovered_statements(&self) -> impl Iterator<Item = &SourceSpan> + '_ {
        self.statement_map
            .iter()
            .flat_map(|map| map.iter())
            .filter(|(id, _)| self.hits_for(id) == 0)
            .map(|(_, location)| location.span())
    }
}

/// One of the four summary metrics.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageMetric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,

    /// Percentage covered, 0 to 100.
    pub pct: f64,
}

impl CoverageMetric {
    pub fn new(covered: u64, total: u64, pct: f64) -> Self {
        Self {
            total: Some(total),
            covered: Some(covered),
            skipped: None,
            pct,
        }
    }

    pub fn from_pct(pct: f64) -> Self {
        Self {
            pct,
            ..Default::default()
        }
    }
}

/// Where a statement lives. Reporters emit either `{"loc": {start, end}}` or
/// the bare `{start, end}` span.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementLocation {
    Wrapped { loc: SourceSpan },
    Bare(SourceSpan),
}

impl StatementLocation {
    pub fn span(&self) -> &SourceSpan {
        match self {
            StatementLocation::Wrapped { loc } => loc,
            StatementLocation::Bare(span) => span,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn lines(start: u32, end: u32) -> Self {
        Self {
            start: Position::line(start),
            end: Position::line(end),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Position {
    pub fn line(line: u32) -> Self {
        Self { line, column: None }
    }
}
