//! Files that fall short of the coverage threshold, and the statements in
//! them that never ran.

use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::models::{CoverageSnapshot, SourceSpan};

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct LowCoverageFile {
    pub file: String,

    /// Line coverage of the file.
    pub coverage: f64,

    /// How far the file is below the threshold. Always positive.
    pub gap: f64,

    /// The file is listed as critical in the configuration.
    pub critical: bool,
}

/// An inclusive range of source lines, rendered as `"start-end"`.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl From<&SourceSpan> for LineRange {
    fn from(span: &SourceSpan) -> Self {
        Self {
            start: span.start.line,
            end: span.end.line,
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl Serialize for LineRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementReport {
    /// Sorted by `gap`, smallest first: the files closest to passing lead.
    pub low_coverage_files: Vec<LowCoverageFile>,

    /// Uncovered statement ranges per low-coverage file, in `statementMap`
    /// order. Files without any uncovered statement have no entry.
    pub uncovered_lines: IndexMap<String, Vec<LineRange>>,
}

impl ImprovementReport {
    pub fn critical_files(&self) -> impl Iterator<Item = &LowCoverageFile> + '_ {
        self.low_coverage_files.iter().filter(|file| file.critical)
    }
}

/// Collects every file whose line coverage is strictly below `threshold`.
pub fn find_improvement_areas(
    current: &CoverageSnapshot,
    threshold: f64,
    critical_files: &[String],
) -> ImprovementReport {
    let mut report = ImprovementReport::default();

    for (path, coverage) in &current.files {
        let pct = coverage.lines.pct;
        if pct >= threshold {
            continue;
        }

        report.low_coverage_files.push(LowCoverageFile {
            file: path.clone(),
            coverage: pct,
            gap: threshold - pct,
            critical: critical_files.iter().any(|critical| critical == path),
        });

        let lines: Vec<LineRange> = coverage
            .uncovered_statements()
            .map(LineRange::from)
            .collect();
        if !lines.is_empty() {
            report.uncovered_lines.insert(path.clone(), lines);
        }
    }

    report
        .low_coverage_files
        .sort_by(|a, b| a.gap.total_cmp(&b.gap));
    report
}
