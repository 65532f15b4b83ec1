//! Progress report data model
//!
//! Both types are derived values: they are recomputed from the stored
//! requirements and detections on every read and never persisted as ground
//! truth, so they cannot drift from the source data.

use serde::{Deserialize, Serialize};

/// Per-requirement outcome of comparing a requirement against the
/// accumulated detection set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub requirement_label: String,
    pub detected: bool,
    /// Matching detections across all of the project's images; two photos
    /// of the same physical object count twice
    pub count: usize,
    /// Highest confidence among matching detections. `None` when nothing
    /// matched, never `Some(0.0)` standing in for absence.
    pub confidence: Option<f64>,
}

/// Aggregate progress output for one project's current data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Fraction of requirements detected at least once, 0-100
    pub completion_percentage: f64,
    /// One entry per requirement, in requirement insertion order
    pub matches: Vec<MatchResult>,
    /// All detections, whether or not they matched a requirement
    pub total_objects_detected: usize,
    /// Distinct raw detection labels, sorted ascending
    pub unique_labels: Vec<String>,
    pub average_confidence: f64,
}

impl ProgressReport {
    /// Number of requirements detected at least once
    pub fn detected_requirements(&self) -> usize {
        self.matches.iter().filter(|m| m.detected).count()
    }
}
