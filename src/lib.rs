pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod parsers;
pub mod render;
pub mod report;
pub mod runner;
pub mod storage;
