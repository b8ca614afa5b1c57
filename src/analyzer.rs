use std::{io::Write, path::Path};

use chrono::{DateTime, Utc};

use crate::{
    config::AnalyzerConfig,
    error::{CoverageError, Result},
    history::{self, PersistedPaths},
    parsers::json_summary::{parse_coverage_summary, serialize_coverage_summary},
    render::{ReportRenderer, ReportView},
    report::{self, models::CoverageSnapshot, ComparisonResult, ImprovementReport},
    runner::TestRunner,
    storage::Storage,
};

/// What a completed run found and wrote.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSummary {
    pub comparison: Option<ComparisonResult>,
    pub improvements: ImprovementReport,

    /// `None` if saving was disabled or failed.
    pub persisted: Option<PersistedPaths>,
}

/// Runs the coverage trend pipeline: test run, load, compare, report, save.
pub struct CoverageAnalyzer<S, R> {
    config: AnalyzerConfig,
    storage: S,
    runner: R,
    renderer: Box<dyn ReportRenderer>,
    save_history: bool,
}

impl<S: Storage, R: TestRunner> CoverageAnalyzer<S, R> {
    pub fn new(
        config: AnalyzerConfig,
        storage: S,
        runner: R,
        renderer: Box<dyn ReportRenderer>,
    ) -> Self {
        Self {
            config,
            storage,
            runner,
            renderer,
            save_history: true,
        }
    }

    /// Turns off writing the baseline and archive at the end of a run.
    pub fn without_history(mut self) -> Self {
        self.save_history = false;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads a snapshot. A missing, unreadable or malformed file all come
    /// back as `None`; the difference only shows up in the log.
    pub fn load(&self, path: &Path) -> Option<CoverageSnapshot> {
        let contents = match self.storage.read(path) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no coverage data");
                return None;
            }
            Err(e) => {
                tracing::warn!("Error reading coverage data from {}: {}", path.display(), e);
                return None;
            }
        };

        match parse_coverage_summary(&contents) {
            Ok(snapshot) => {
                tracing::debug!(
                    path = %path.display(),
                    files = snapshot.files.len(),
                    "loaded coverage data"
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!("Error reading coverage data from {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn compare(
        &self,
        current: &CoverageSnapshot,
        previous: Option<&CoverageSnapshot>,
    ) -> Option<ComparisonResult> {
        report::compare(current, previous)
    }

    pub fn find_improvement_areas(&self, current: &CoverageSnapshot) -> ImprovementReport {
        report::find_improvement_areas(
            current,
            self.config.coverage_threshold,
            &self.config.critical_files,
        )
    }

    pub fn report(
        &self,
        out: &mut dyn Write,
        current: &CoverageSnapshot,
        comparison: Option<&ComparisonResult>,
        improvements: &ImprovementReport,
    ) -> Result<()> {
        let view = ReportView {
            current,
            comparison,
            improvements,
            threshold: self.config.coverage_threshold,
            top_files: self.config.top_files,
        };
        self.renderer.render(out, &view)
    }

    /// Saves `current` as the new baseline and as a new archive entry.
    pub fn persist(&self, current: &CoverageSnapshot) -> Result<PersistedPaths> {
        self.persist_at(current, Utc::now())
    }

    pub fn persist_at(
        &self,
        current: &CoverageSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Result<PersistedPaths> {
        let dir = &self.config.coverage_history_dir;
        self.storage.ensure_dir(dir)?;

        let contents = serialize_coverage_summary(current)?;
        let baseline = self.config.baseline_path();
        self.storage.write(&baseline, &contents)?;

        let archive = history::archive_path(&self.storage, dir, timestamp)?;
        self.storage.write(&archive, &contents)?;

        tracing::info!("Coverage history saved.");
        tracing::debug!(
            baseline = %baseline.display(),
            archive = %archive.display(),
            "wrote coverage history"
        );
        Ok(PersistedPaths { baseline, archive })
    }

    /// The whole pipeline. Fails if the test step fails (nothing is read in
    /// that case) or if the current summary can't be read afterwards. Failing
    /// to write the report or to save history is logged and otherwise ignored.
    pub fn run(&self, out: &mut dyn Write) -> Result<RunSummary> {
        self.runner.run()?;

        let summary_path = &self.config.coverage_summary_path;
        let current = self
            .load(summary_path)
            .ok_or_else(|| CoverageError::MissingCurrentCoverage(summary_path.clone()))?;
        let previous = self.load(&self.config.baseline_path());
        if previous.is_none() {
            tracing::info!("No previous coverage data, skipping comparison");
        }

        let comparison = self.compare(&current, previous.as_ref());
        let improvements = self.find_improvement_areas(&current);
        if let Err(e) = self.report(out, &current, comparison.as_ref(), &improvements) {
            tracing::error!("Error writing coverage report: {}", e);
        }

        let persisted = if self.save_history {
            match self.persist(&current) {
                Ok(paths) => Some(paths),
                Err(e) => {
                    tracing::error!("Error saving coverage history: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(RunSummary {
            comparison,
            improvements,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;

    use super::*;
    use crate::{
        render::TextRenderer,
        report::models::FileCoverage,
        runner::{MockTestRunner, SkipTests},
        storage::{MemoryStorage, MockStorage},
    };

    const CURRENT: &str = r#"{
        "total": {"lines": {"pct": 85}, "statements": {"pct": 84}, "branches": {"pct": 70}, "functions": {"pct": 90}},
        "a.js": {
            "lines": {"pct": 60},
            "statementMap": {"0": {"loc": {"start": {"line": 5}, "end": {"line": 5}}}},
            "s": {"0": 0}
        }
    }"#;

    const PREVIOUS: &str = r#"{
        "total": {"lines": {"pct": 80}},
        "a.js": {"lines": {"pct": 50}}
    }"#;

    fn analyzer<S: Storage, R: TestRunner>(storage: S, runner: R) -> CoverageAnalyzer<S, R> {
        CoverageAnalyzer::new(
            AnalyzerConfig::default(),
            storage,
            runner,
            Box::new(TextRenderer::new(false)),
        )
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 9, 12, 34, 56).unwrap()
    }

    #[test]
    fn test_load_missing_is_absent() {
        let analyzer = analyzer(MemoryStorage::new(), SkipTests);
        assert_eq!(analyzer.load(Path::new("does/not/exist.json")), None);
    }

    #[test]
    fn test_load_malformed_is_absent() {
        let storage = MemoryStorage::new().with_file("coverage/coverage-summary.json", "{ nope");
        let analyzer = analyzer(storage, SkipTests);
        assert_eq!(
            analyzer.load(Path::new("coverage/coverage-summary.json")),
            None
        );
    }

    #[test]
    fn test_load_io_error_is_absent() {
        let mut storage = MockStorage::new();
        storage
            .expect_read()
            .returning(|_| Err(std::io::Error::other("disk on fire").into()));
        let analyzer = analyzer(storage, SkipTests);
        assert_eq!(analyzer.load(Path::new("x.json")), None);
    }

    #[test]
    fn test_scenario() {
        let storage = MemoryStorage::new()
            .with_file("coverage/coverage-summary.json", CURRENT)
            .with_file("coverage-history/previous-coverage.json", PREVIOUS);
        let analyzer = analyzer(storage, SkipTests);

        let mut out = Vec::new();
        let summary = analyzer.run(&mut out).unwrap();

        let comparison = summary.comparison.unwrap();
        assert_eq!(comparison.overall.change, 5.0);
        assert_eq!(comparison.files["a.js"].delta.change, 10.0);
        assert_eq!(summary.improvements.low_coverage_files.len(), 1);
        assert_eq!(summary.improvements.low_coverage_files[0].gap, 20.0);
        assert_eq!(
            summary.improvements.uncovered_lines["a.js"]
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["5-5"]
        );

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Coverage Change: ▲ 5.00%"));
        assert!(output.contains("  a.js: 60.00% (20.00% below threshold)"));
    }

    #[test]
    fn test_run_persists_current_as_baseline() {
        let storage = MemoryStorage::new().with_file("coverage/coverage-summary.json", CURRENT);
        let analyzer = analyzer(storage, SkipTests);

        let summary = analyzer.run(&mut Vec::new()).unwrap();
        assert_eq!(summary.comparison, None);

        let persisted = summary.persisted.unwrap();
        assert_eq!(
            persisted.baseline,
            PathBuf::from("coverage-history/previous-coverage.json")
        );
        assert!(persisted.archive.starts_with("coverage-history"));

        let current = analyzer.load(Path::new("coverage/coverage-summary.json"));
        assert_eq!(analyzer.load(&persisted.baseline), current);
        assert_eq!(analyzer.load(&persisted.archive), current);
        assert_eq!(analyzer.storage().paths().len(), 3);
    }

    #[test]
    fn test_without_history() {
        let storage = MemoryStorage::new().with_file("coverage/coverage-summary.json", CURRENT);
        let analyzer = analyzer(storage, SkipTests).without_history();

        let summary = analyzer.run(&mut Vec::new()).unwrap();
        assert_eq!(summary.persisted, None);
        assert_eq!(analyzer.storage().paths().len(), 1);
    }

    #[test]
    fn test_failed_tests_abort_before_reading() {
        // No expectations: any storage call fails the test
        let storage = MockStorage::new();
        let mut runner = MockTestRunner::new();
        runner.expect_run().times(1).returning(|| {
            Err(CoverageError::TestCommandSpawn {
                command: "npm test".to_string(),
                source: std::io::Error::other("npm: not found"),
            })
        });
        let analyzer = analyzer(storage, runner);

        let mut out = Vec::new();
        assert!(analyzer.run(&mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_current_is_fatal() {
        let storage = MemoryStorage::new()
            .with_file("coverage-history/previous-coverage.json", PREVIOUS);
        let analyzer = analyzer(storage, SkipTests);

        let mut out = Vec::new();
        match analyzer.run(&mut out) {
            Err(CoverageError::MissingCurrentCoverage(path)) => {
                assert_eq!(path, PathBuf::from("coverage/coverage-summary.json"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_malformed_baseline_skips_comparison() {
        let storage = MemoryStorage::new()
            .with_file("coverage/coverage-summary.json", CURRENT)
            .with_file("coverage-history/previous-coverage.json", "garbage");
        let analyzer = analyzer(storage, SkipTests);

        let mut out = Vec::new();
        let summary = analyzer.run(&mut out).unwrap();
        assert_eq!(summary.comparison, None);
        assert!(!String::from_utf8(out).unwrap().contains("Coverage Change"));
        assert!(summary.persisted.is_some());
    }

    #[test]
    fn test_persist_failure_is_not_fatal() {
        let mut storage = MockStorage::new();
        storage
            .expect_read()
            .withf(|path| path == Path::new("coverage/coverage-summary.json"))
            .returning(|_| Ok(Some(CURRENT.as_bytes().to_vec())));
        storage
            .expect_read()
            .withf(|path| path == Path::new("coverage-history/previous-coverage.json"))
            .returning(|_| Ok(None));
        storage
            .expect_ensure_dir()
            .times(1)
            .returning(|_| Err(std::io::Error::other("read-only filesystem").into()));
        storage.expect_write().never();
        let analyzer = analyzer(storage, SkipTests);

        let summary = analyzer.run(&mut Vec::new()).unwrap();
        assert_eq!(summary.persisted, None);
        assert_eq!(summary.improvements.low_coverage_files.len(), 1);
    }

    #[test]
    fn test_persist_twice() {
        let analyzer = analyzer(MemoryStorage::new(), SkipTests);
        let snapshot = CoverageSnapshot::new(FileCoverage::from_line_pct(42.0))
            .with_file("a.js", FileCoverage::from_line_pct(42.0));

        let first = analyzer.persist_at(&snapshot, timestamp()).unwrap();
        let baseline_after_first = analyzer.storage().contents(&first.baseline);
        let second = analyzer.persist_at(&snapshot, timestamp()).unwrap();

        assert_eq!(first.baseline, second.baseline);
        assert_ne!(first.archive, second.archive);
        assert_eq!(analyzer.storage().contents(&second.baseline), baseline_after_first);
        assert_eq!(
            analyzer.storage().contents(&first.archive),
            analyzer.storage().contents(&second.archive)
        );
        assert_eq!(analyzer.load(&second.baseline), Some(snapshot));
    }

    #[test]
    fn test_persist_writes_baseline_then_archive() {
        let mut seq = mockall::Sequence::new();
        let mut storage = MockStorage::new();
        storage
            .expect_ensure_dir()
            .withf(|path| path == Path::new("coverage-history"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        storage
            .expect_write()
            .withf(|path, _| path == Path::new("coverage-history/previous-coverage.json"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        storage
            .expect_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        storage
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("coverage-history/coverage-2024-01-09T12-34-56-000Z.json")
                    && contents.starts_with(b"{\n  \"total\"")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let analyzer = analyzer(storage, SkipTests);
        let snapshot = CoverageSnapshot::new(FileCoverage::from_line_pct(42.0));
        analyzer.persist_at(&snapshot, timestamp()).unwrap();
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn test_report_failure_still_persists() {
        let storage = MemoryStorage::new()
            .with_file("coverage/coverage-summary.json", CURRENT)
            .with_file("coverage-history/previous-coverage.json", PREVIOUS);
        let analyzer = analyzer(storage, SkipTests);

        let summary = analyzer.run(&mut FailingWriter).unwrap();
        assert!(summary.comparison.is_some());

        let persisted = summary.persisted.unwrap();
        assert_eq!(
            analyzer.load(&persisted.baseline),
            analyzer.load(Path::new("coverage/coverage-summary.json"))
        );
        assert!(analyzer.storage().contents(&persisted.archive).is_some());
    }

    #[test]
    fn test_persist_copies_the_summary_document() {
        let summary = r#"{
            "total": {"lines": {"pct": 85}, "branchesTrue": {"total": 0, "covered": 0, "pct": 100}},
            "a.js": {
                "path": "/repo/a.js",
                "lines": {"pct": 60},
                "statementMap": {"0": {"start": {"line": 5, "column": 0}, "end": {"line": 5, "column": null}}},
                "s": {"0": 0},
                "fnMap": {},
                "f": {}
            }
        }"#;
        let storage = MemoryStorage::new().with_file("coverage/coverage-summary.json", summary);
        let analyzer = analyzer(storage, SkipTests);

        let persisted = analyzer.run(&mut Vec::new()).unwrap().persisted.unwrap();

        let original: serde_json::Value = serde_json::from_str(summary).unwrap();
        for path in [&persisted.baseline, &persisted.archive] {
            let written: serde_json::Value =
                serde_json::from_slice(&analyzer.storage().contents(path).unwrap()).unwrap();
            assert_eq!(written, original);
        }
    }
}
