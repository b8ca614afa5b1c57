#![allow(dead_code)]

use std::fs;

use covtrend::{
    analyzer::CoverageAnalyzer, config::AnalyzerConfig, render::TextRenderer,
    runner::SkipTests, storage::LocalStorage,
};
use tempfile::TempDir;
use test_utils::fixtures::{read_fixture, FixtureFormat};

pub struct Ctx {
    pub temp_dir: TempDir,
    pub config: AnalyzerConfig,
}

/// A scratch project directory with the default layout rooted in it.
pub fn setup() -> Ctx {
    let temp_dir = TempDir::new().ok().unwrap();
    let root = temp_dir.path();

    let config = AnalyzerConfig {
        coverage_summary_path: root.join("coverage/coverage-summary.json"),
        coverage_history_dir: root.join("coverage-history"),
        ..AnalyzerConfig::default()
    };

    Ctx { temp_dir, config }
}

impl Ctx {
    /// Stands in for the test run by writing the summary it would produce.
    pub fn write_summary(&self, contents: &[u8]) {
        let path = &self.config.coverage_summary_path;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn write_summary_fixture(&self, name: &str) {
        self.write_summary(&read_fixture(FixtureFormat::JsonSummary, name).unwrap());
    }

    /// Sorted names of everything in the history directory.
    pub fn history_entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = fs::read_dir(&self.config.coverage_history_dir)
            .map(|dir| {
                dir.map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        entries.sort();
        entries
    }

    pub fn analyzer(&self) -> CoverageAnalyzer<LocalStorage, SkipTests> {
        CoverageAnalyzer::new(
            self.config.clone(),
            LocalStorage,
            SkipTests,
            Box::new(TextRenderer::new(false)),
        )
    }
}
