use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoverageError, Result};

pub const DEFAULT_THRESHOLD: f64 = 80.0;
pub const DEFAULT_SUMMARY_PATH: &str = "coverage/coverage-summary.json";
pub const DEFAULT_HISTORY_DIR: &str = "coverage-history";
pub const DEFAULT_BASELINE_FILE: &str = "previous-coverage.json";
pub const DEFAULT_TOP_FILES: usize = 5;

/// Everything the analyzer needs to know about thresholds and locations.
/// Every key is optional when loaded from a JSON file.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Minimum acceptable line coverage percentage.
    pub coverage_threshold: f64,

    /// Files that must keep high coverage; flagged when below threshold.
    pub critical_files: Vec<String>,

    /// Summary produced by the test run.
    pub coverage_summary_path: PathBuf,

    pub coverage_history_dir: PathBuf,

    /// Name of the baseline file inside `coverage_history_dir`.
    pub baseline_file_name: String,

    /// How many most improved / most declined files the report lists.
    pub top_files: usize,

    /// Program and arguments of the test step.
    pub test_command: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            coverage_threshold: DEFAULT_THRESHOLD,
            critical_files: Vec::new(),
            coverage_summary_path: PathBuf::from(DEFAULT_SUMMARY_PATH),
            coverage_history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
            baseline_file_name: DEFAULT_BASELINE_FILE.to_string(),
            top_files: DEFAULT_TOP_FILES,
            test_command: ["npm", "test", "--", "--coverage", "--watchAll=false"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl AnalyzerConfig {
    /// Loads a JSON config file. Keys that are left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read(path)?;
        let config: AnalyzerConfig = serde_json::from_slice(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Where the previous run's snapshot is kept.
    pub fn baseline_path(&self) -> PathBuf {
        self.coverage_history_dir.join(&self.baseline_file_name)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.coverage_threshold) {
            return Err(CoverageError::InvalidConfig(format!(
                "coverage threshold must be between 0 and 100, got {}",
                self.coverage_threshold
            )));
        }
        if self.top_files == 0 {
            return Err(CoverageError::InvalidConfig(
                "top files must be at least 1".to_string(),
            ));
        }
        if self.test_command.is_empty() {
            return Err(CoverageError::InvalidConfig(
                "test command is empty".to_string(),
            ));
        }
        if self.baseline_file_name.is_empty() {
            return Err(CoverageError::InvalidConfig(
                "baseline file name is empty".to_string(),
            ));
        }
        Ok(())
    }
}
