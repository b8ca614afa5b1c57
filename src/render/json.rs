use std::io::Write;

use serde::Serialize;

use super::{ReportRenderer, ReportView};
use crate::{
    error::Result,
    report::{
        models::{CoverageMetric, FileCoverage},
        ComparisonResult, CoverageDelta, FileDelta, ImprovementReport,
    },
};

/// Writes the report data as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

#[derive(Serialize)]
struct TotalsDocument<'a> {
    lines: &'a CoverageMetric,
    statements: Option<&'a CoverageMetric>,
    branches: Option<&'a CoverageMetric>,
    functions: Option<&'a CoverageMetric>,
}

impl<'a> From<&'a FileCoverage> for TotalsDocument<'a> {
    fn from(total: &'a FileCoverage) -> Self {
        Self {
            lines: &total.lines,
            statements: total.statements.as_ref(),
            branches: total.branches.as_ref(),
            functions: total.functions.as_ref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoverDocument<'a> {
    file: &'a str,
    #[serde(flatten)]
    delta: &'a FileDelta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComparisonDocument<'a> {
    overall: &'a CoverageDelta,
    most_improved: Vec<MoverDocument<'a>>,
    most_declined: Vec<MoverDocument<'a>>,
    files: &'a indexmap::IndexMap<String, FileDelta>,
}

impl<'a> ComparisonDocument<'a> {
    fn new(comparison: &'a ComparisonResult, top_files: usize) -> Self {
        let movers = |files: Vec<(&'a str, &'a FileDelta)>| -> Vec<MoverDocument<'a>> {
            files
                .into_iter()
                .map(|(file, delta)| MoverDocument { file, delta })
                .collect()
        };
        Self {
            overall: &comparison.overall,
            most_improved: movers(comparison.most_improved(top_files)),
            most_declined: movers(comparison.most_declined(top_files)),
            files: &comparison.files,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    threshold: f64,
    total: TotalsDocument<'a>,
    comparison: Option<ComparisonDocument<'a>>,
    #[serde(flatten)]
    improvements: &'a ImprovementReport,
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, out: &mut dyn Write, view: &ReportView<'_>) -> Result<()> {
        let document = ReportDocument {
            threshold: view.threshold,
            total: TotalsDocument::from(&view.current.total),
            comparison: view
                .comparison
                .map(|comparison| ComparisonDocument::new(comparison, view.top_files)),
            improvements: view.improvements,
        };
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)?;
        Ok(())
    }
}
