pub mod models;

pub mod comparison;
pub use comparison::{compare, ComparisonResult, CoverageDelta, FileDelta};

pub mod improvement;
pub use improvement::{find_improvement_areas, ImprovementReport, LineRange, LowCoverageFile};
