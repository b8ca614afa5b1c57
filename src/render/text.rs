use std::io::Write;

use colored::{ColoredString, Colorize};

use super::{ReportRenderer, ReportView};
use crate::{
    error::Result,
    report::{models::CoverageMetric, FileDelta},
};

const HEADER: &str = "========== COVERAGE REPORT ==========";
const FOOTER: &str = "======================================";
const UP: &str = "▲";
const DOWN: &str = "▼";

/// The console report. ANSI colours are optional so the output can be piped.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: String, colorize: fn(ColoredString) -> ColoredString) -> String {
        if self.color {
            colorize(text.as_str().normal()).to_string()
        } else {
            text
        }
    }

    fn up(&self, change: f64) -> String {
        self.paint(format!("{UP} {:.2}%", change.abs()), |s| s.green())
    }

    fn down(&self, change: f64) -> String {
        self.paint(format!("{DOWN} {:.2}%", change.abs()), |s| s.red())
    }

    fn write_mover(&self, out: &mut dyn Write, path: &str, file: &FileDelta) -> Result<()> {
        let change = if file.delta.change >= 0.0 {
            self.up(file.delta.change)
        } else {
            self.down(file.delta.change)
        };
        write!(
            out,
            "  {path}: {change} ({:.2}% → {:.2}%)",
            file.delta.previous, file.delta.current
        )?;
        if file.is_new {
            write!(out, " [new]")?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn pct(metric: Option<&CoverageMetric>) -> String {
    match metric {
        Some(metric) => format!("{:.2}%", metric.pct),
        None => "n/a".to_string(),
    }
}

impl ReportRenderer for TextRenderer {
    fn render(&self, out: &mut dyn Write, view: &ReportView<'_>) -> Result<()> {
        let total = &view.current.total;

        writeln!(out, "\n{HEADER}\n")?;
        writeln!(out, "Overall Coverage: {}", pct(Some(&total.lines)))?;
        writeln!(out, "Statement Coverage: {}", pct(total.statements.as_ref()))?;
        writeln!(out, "Branch Coverage: {}", pct(total.branches.as_ref()))?;
        writeln!(out, "Function Coverage: {}", pct(total.functions.as_ref()))?;

        if let Some(comparison) = view.comparison {
            let change = if comparison.overall.is_improvement() {
                self.up(comparison.overall.change)
            } else {
                self.down(comparison.overall.change)
            };
            writeln!(out, "\nCoverage Change: {change}")?;

            let improved = comparison.most_improved(view.top_files);
            if !improved.is_empty() {
                writeln!(out, "\nMost Improved Files:")?;
                for (path, file) in improved {
                    self.write_mover(out, path, file)?;
                }
            }

            let declined = comparison.most_declined(view.top_files);
            if !declined.is_empty() {
                writeln!(out, "\nFiles with Declining Coverage:")?;
                for (path, file) in declined {
                    self.write_mover(out, path, file)?;
                }
            }
        }

        let low = &view.improvements.low_coverage_files;
        if !low.is_empty() {
            writeln!(out, "\nFiles Below Threshold:")?;
            for file in low {
                write!(
                    out,
                    "  {}: {:.2}% ({:.2}% below threshold)",
                    file.file, file.coverage, file.gap
                )?;
                if file.critical {
                    let tag = self.paint("[critical]".to_string(), |s| s.red().bold());
                    write!(out, " {tag}")?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "\n{FOOTER}\n")?;
        Ok(())
    }
}
