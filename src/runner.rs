#[cfg(test)]
use mockall::automock;

use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

use crate::error::{CoverageError, Result};

/// The step that runs the test suite and leaves a fresh coverage summary on
/// disk.
#[cfg_attr(test, automock)]
pub trait TestRunner {
    fn run(&self) -> Result<()>;
}

/// Runs the test suite as a child process. Its output goes straight to the
/// terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandRunner {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CoverageError::InvalidConfig("test command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: None,
        })
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TestRunner for CommandRunner {
    fn run(&self) -> Result<()> {
        tracing::info!("Running tests and generating coverage...");
        tracing::debug!(command = %self.command_line(), "spawning test command");

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .map_err(|source| CoverageError::TestCommandSpawn {
                command: self.command_line(),
                source,
            })?;
        if !status.success() {
            return Err(CoverageError::TestCommandFailed {
                command: self.command_line(),
                status,
            });
        }

        tracing::info!("Coverage generated successfully!");
        Ok(())
    }
}

/// Analyzes whatever summary is already on disk without running anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipTests;

impl TestRunner for SkipTests {
    fn run(&self) -> Result<()> {
        tracing::info!("Skipping test run, using existing coverage data");
        Ok(())
    }
}
