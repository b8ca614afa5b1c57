use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

pub type Result<T, E = CoverageError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("io error: '{0}'")]
    IOError(#[from] std::io::Error),

    #[error("parser error: '{0}'")]
    Json(#[from] serde_json::Error),

    #[error("test command `{command}` failed: {status}")]
    TestCommandFailed { command: String, status: ExitStatus },

    // Can't use #[from], the command line is needed for the message
    #[error("failed to launch test command `{command}`: '{source}'")]
    TestCommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "could not read current coverage data from '{}'. Make sure tests have run successfully.",
        .0.display()
    )]
    MissingCurrentCoverage(PathBuf),

    #[error("invalid configuration: '{0}'")]
    InvalidConfig(String),
}
