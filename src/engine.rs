//! Analysis engine, finding aggregation and file discovery

pub mod aggregator;
pub mod executor;
pub mod file_walker;

pub use aggregator::{FindingAggregator, Summary};
pub use executor::{AnalysisEngine, AnalysisResult, DetectorFailure, FileReport};
