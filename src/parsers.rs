pub mod json_summary;

pub use json_summary::{parse_coverage_summary, serialize_coverage_summary};
