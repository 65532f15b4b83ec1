//! Progress comparison module

pub mod engine;
pub mod report;

pub use engine::compute_progress_report;
pub use report::{MatchResult, ProgressReport};
