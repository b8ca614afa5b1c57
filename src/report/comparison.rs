//! Line-coverage deltas between the current snapshot and the baseline.

use indexmap::IndexMap;
use serde::Serialize;

use super::models::CoverageSnapshot;

#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct CoverageDelta {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
}

impl CoverageDelta {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change: current - previous,
        }
    }

    pub fn is_improvement(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDelta {
    #[serde(flatten)]
    pub delta: CoverageDelta,

    /// The file has no entry in the baseline; `previous` is 0.
    pub is_new: bool,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub overall: CoverageDelta,

    /// One entry per file of the current snapshot, in its order. Files only
    /// present in the baseline are not listed.
    pub files: IndexMap<String, FileDelta>,
}

impl ComparisonResult {
    /// Up to `limit` files whose coverage went up, largest gain first.
    pub fn most_improved(&self, limit: usize) -> Vec<(&str, &FileDelta)> {
        let mut improved: Vec<_> = self
            .files
            .iter()
            .filter(|(_, file)| file.delta.change > 0.0)
            .map(|(path, file)| (path.as_str(), file))
            .collect();
        // `sort_by` is stable, equal changes keep snapshot order
        improved.sort_by(|(_, a), (_, b)| b.delta.change.total_cmp(&a.delta.change));
        improved.truncate(limit);
        improved
    }

    /// Up to `limit` files whose coverage went down, largest loss first.
    pub fn most_declined(&self, limit: usize) -> Vec<(&str, &FileDelta)> {
        let mut declined: Vec<_> = self
            .files
            .iter()
            .filter(|(_, file)| file.delta.change < 0.0)
            .map(|(path, file)| (path.as_str(), file))
            .collect();
        declined.sort_by(|(_, a), (_, b)| a.delta.change.total_cmp(&b.delta.change));
        declined.truncate(limit);
        declined
    }
}

/// Compares line coverage of `current` against `previous`.
///
/// Returns `None` when there is no baseline. A file missing from the baseline
/// is reported as new with a previous coverage of 0. Files that only exist in
/// the baseline are dropped rather than reported as a decline.
pub fn compare(
    current: &CoverageSnapshot,
    previous: Option<&CoverageSnapshot>,
) -> Option<ComparisonResult> {
    let previous = previous?;

    let files = current
        .files
        .iter()
        .map(|(path, coverage)| {
            let delta = match previous.file(path) {
                Some(before) => FileDelta {
                    delta: CoverageDelta::new(coverage.lines.pct, before.lines.pct),
                    is_new: false,
                },
                None => FileDelta {
                    delta: CoverageDelta::new(coverage.lines.pct, 0.0),
                    is_new: true,
                },
            };
            (path.clone(), delta)
        })
        .collect();

    Some(ComparisonResult {
        overall: CoverageDelta::new(current.line_pct(), previous.line_pct()),
        files,
    })
}
