//! Layout of the coverage history directory: one overwritten baseline file
//! plus one archive entry per run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{error::Result, storage::Storage};

const ARCHIVE_PREFIX: &str = "coverage-";
const ARCHIVE_EXTENSION: &str = "json";

/// Archive file name for a run at `timestamp`, e.g.
/// `coverage-2024-01-09T12-34-56-789Z.json`.
///
/// The timestamp is ISO 8601 with millisecond precision, with `:` and `.`
/// replaced by `-` so the name is valid on every filesystem.
pub fn archive_file_name(timestamp: DateTime<Utc>) -> String {
    let stamp = timestamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{ARCHIVE_PREFIX}{stamp}.{ARCHIVE_EXTENSION}")
}

/// Picks the archive path for a run at `timestamp` inside `dir`.
///
/// Two runs within the same millisecond would share a name, so an existing
/// entry gets a numeric suffix instead of being overwritten.
pub fn archive_path<S: Storage + ?Sized>(
    storage: &S,
    dir: &Path,
    timestamp: DateTime<Utc>,
) -> Result<PathBuf> {
    let name = archive_file_name(timestamp);
    let candidate = dir.join(&name);
    if !storage.exists(&candidate)? {
        return Ok(candidate);
    }

    let stem = name.trim_end_matches(&format!(".{ARCHIVE_EXTENSION}"));
    let mut suffix = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{suffix}.{ARCHIVE_EXTENSION}"));
        if !storage.exists(&candidate)? {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

/// Paths written by a successful persist.
#[derive(PartialEq, Debug, Clone)]
pub struct PersistedPaths {
    pub baseline: PathBuf,
    pub archive: PathBuf,
}
