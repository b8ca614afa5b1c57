//! Presentation of an analysis. Renderers only format; every number they
//! print is computed in [`crate::report`].

use std::io::Write;

use strum_macros::{Display, EnumString};

use crate::{
    error::Result,
    report::{models::CoverageSnapshot, ComparisonResult, ImprovementReport},
};

mod json;
pub use json::JsonRenderer;

mod text;
pub use text::TextRenderer;

#[derive(EnumString, Display, Debug, PartialEq, Clone, Copy, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Human-readable console report.
    #[default]
    Text,

    /// The report data as pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn renderer(self, color: bool) -> Box<dyn ReportRenderer> {
        match self {
            OutputFormat::Text => Box::new(TextRenderer::new(color)),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// The inputs of one report, borrowed from the analysis.
#[derive(Debug, Clone, Copy)]
pub struct ReportView<'a> {
    pub current: &'a CoverageSnapshot,
    pub comparison: Option<&'a ComparisonResult>,
    pub improvements: &'a ImprovementReport,
    pub threshold: f64,

    /// How many most improved / most declined files to list.
    pub top_files: usize,
}

pub trait ReportRenderer {
    fn render(&self, out: &mut dyn Write, view: &ReportView<'_>) -> Result<()>;
}
