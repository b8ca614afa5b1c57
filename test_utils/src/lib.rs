pub mod fixtures;
pub mod rng;
pub mod summaries;
