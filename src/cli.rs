use std::{
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    analyzer::{CoverageAnalyzer, RunSummary},
    config::AnalyzerConfig,
    error::Result,
    render::OutputFormat,
    runner::{CommandRunner, SkipTests, TestRunner},
    storage::LocalStorage,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Runs the test suite, compares coverage against the previous run and lists files below the threshold",
    long_about = None
)]
#[command(override_usage = "covtrend [OPTIONS] [-- <TEST_COMMAND>...]")]
pub struct Cli {
    #[arg(long, short, help = "JSON config file")]
    config: Option<PathBuf>,

    #[arg(long, short, help = "Minimum acceptable line coverage percentage")]
    threshold: Option<f64>,

    #[arg(long, help = "Coverage summary written by the test run")]
    summary: Option<PathBuf>,

    #[arg(long, help = "Directory holding the baseline and archived runs")]
    history_dir: Option<PathBuf>,

    #[arg(long, help = "Number of most improved / declined files to list")]
    top: Option<usize>,

    #[arg(long, short, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(long, default_value_t = false, help = "Disable ANSI colours")]
    no_color: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Analyze the existing summary without running the tests"
    )]
    skip_tests: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Don't update the baseline or the archive"
    )]
    no_save: bool,

    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    /// Replaces the configured test command.
    #[arg(last = true)]
    test_command: Vec<String>,
}

impl Cli {
    /// The configuration file (or the defaults) with flags applied on top.
    pub fn config(&self) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config.coverage_threshold = threshold;
        }
        if let Some(summary) = &self.summary {
            config.coverage_summary_path = summary.clone();
        }
        if let Some(dir) = &self.history_dir {
            config.coverage_history_dir = dir.clone();
        }
        if let Some(top) = self.top {
            config.top_files = top;
        }
        if !self.test_command.is_empty() {
            config.test_command = self.test_command.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Reports go to stdout, diagnostics to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn execute<R: TestRunner>(cli: &Cli, config: AnalyzerConfig, runner: R) -> Result<RunSummary> {
    let stdout = io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let renderer = cli.format.renderer(color);

    let mut analyzer = CoverageAnalyzer::new(config, LocalStorage, runner, renderer);
    if cli.no_save {
        analyzer = analyzer.without_history();
    }

    let mut out = stdout.lock();
    let summary = analyzer.run(&mut out)?;
    if let Err(e) = out.flush() {
        tracing::error!("Error writing coverage report: {}", e);
    }
    Ok(summary)
}

fn run_cli(cli: &Cli) -> Result<RunSummary> {
    let config = cli.config()?;
    if cli.skip_tests {
        execute(cli, config, SkipTests)
    } else {
        let runner = CommandRunner::new(&config.test_command)?;
        execute(cli, config, runner)
    }
}

/// Entry point of the `covtrend` binary.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_cli(&cli) {
        Ok(summary) => {
            tracing::debug!(
                low_coverage_files = summary.improvements.low_coverage_files.len(),
                compared = summary.comparison.is_some(),
                "analysis finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(1)
        }
    }
}
