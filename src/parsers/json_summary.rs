//! Reads and writes the JSON coverage summary written by Istanbul-style
//! reporters (`json-summary`, and `json` for statement detail).
//!
//! At a high level, the input looks like:
//! ```notrust
//! {
//!     "total": {
//!         "lines": {"total": 120, "covered": 102, "skipped": 0, "pct": 85},
//!         "statements": {...},
//!         "functions": {...},
//!         "branches": {...}
//!     },
//!     "/abs/path/src/components/Banner.jsx": {
//!         "lines": {...},
//!         ...
//!         "statementMap": {"0": {"start": {"line": 5, "column": 2}, "end": {"line": 5, "column": 40}}},
//!         "s": {"0": 0}
//!     }
//! }
//! ```
//! The `total` key is reserved for the project aggregate. Every other key is a
//! source file.

use serde::Deserialize;
use serde_json::Value;

use crate::{error::Result, report::models::CoverageSnapshot};

/// Parses a coverage summary document. The snapshot keeps the document as its
/// `source`.
pub fn parse_coverage_summary(input: &[u8]) -> Result<CoverageSnapshot> {
    let document: Value = serde_json::from_slice(input)?;
    let mut snapshot = CoverageSnapshot::deserialize(&document)?;
    snapshot.source = Some(document);
    Ok(snapshot)
}

/// Encodes a snapshot as pretty-printed JSON (two-space indent), the shape
/// used for both the baseline and the archive entries.
///
/// A parsed snapshot is written as the document it came from, so keys and
/// number formatting the models don't track survive. Snapshots built in code
/// are encoded from the models.
pub fn serialize_coverage_summary(snapshot: &CoverageSnapshot) -> Result<Vec<u8>> {
    match &snapshot.source {
        Some(document) => Ok(serde_json::to_vec_pretty(document)?),
        None => Ok(serde_json::to_vec_pretty(snapshot)?),
    }
}
