//! Requirement-vs-detection comparison engine
//!
//! A pure function from `(requirements, detections)` to a progress report.
//! It holds no state and performs no I/O; identical inputs yield identical
//! output, so reports are recomputed on every read and may be computed
//! concurrently without locking.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::detection::{clamp_confidence, RawDetection};
use crate::label::normalize;
use crate::progress::report::{MatchResult, ProgressReport};
use crate::requirement::Requirement;

/// Decimal places kept on the completion percentage
const COMPLETION_DECIMALS: i32 = 2;
/// Decimal places kept on the average confidence
const CONFIDENCE_DECIMALS: i32 = 3;

/// Compare a requirement list against the accumulated raw detections of a
/// project and produce its progress report.
///
/// Matching is exact equality of normalized labels; each requirement
/// contributes equally to the completion percentage regardless of how many
/// instances were found or at what confidence. An empty requirement list
/// reports 0% by convention so an unconfigured project never reads as
/// complete.
pub fn compute_progress_report(
    requirements: &[Requirement],
    detections: &[RawDetection],
) -> ProgressReport {
    let groups = group_by_normalized_label(detections);

    let matches: Vec<MatchResult> = requirements
        .iter()
        .map(|requirement| match_requirement(requirement, &groups))
        .collect();

    let completion_percentage = if matches.is_empty() {
        0.0
    } else {
        let detected = matches.iter().filter(|m| m.detected).count();
        round_to(
            100.0 * detected as f64 / matches.len() as f64,
            COMPLETION_DECIMALS,
        )
    };

    // Summary fields cover every detection, matched or not, including
    // labels that normalize to nothing.
    let average_confidence = if detections.is_empty() {
        0.0
    } else {
        let total: f64 = detections
            .iter()
            .map(|d| clamp_confidence(d.confidence))
            .sum();
        round_to(total / detections.len() as f64, CONFIDENCE_DECIMALS)
    };

    let unique_labels: Vec<String> = detections
        .iter()
        .map(|d| d.label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    ProgressReport {
        completion_percentage,
        matches,
        total_objects_detected: detections.len(),
        unique_labels,
        average_confidence,
    }
}

/// Group clamped detection confidences by normalized label.
///
/// Labels that normalize to the empty string can match no requirement and
/// are excluded from the groups; they still count toward the report's
/// summary fields.
fn group_by_normalized_label(detections: &[RawDetection]) -> HashMap<String, Vec<f64>> {
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();

    for detection in detections {
        let key = normalize(&detection.label);
        if key.is_empty() {
            warn!(
                source_image = %detection.source_image_id,
                "detection label is blank after normalization and can match no requirement"
            );
            continue;
        }
        groups
            .entry(key)
            .or_default()
            .push(clamp_confidence(detection.confidence));
    }

    groups
}

fn match_requirement(
    requirement: &Requirement,
    groups: &HashMap<String, Vec<f64>>,
) -> MatchResult {
    let key = normalize(&requirement.label);
    let confidences = if key.is_empty() {
        None
    } else {
        groups.get(&key)
    };

    match confidences {
        Some(confidences) => MatchResult {
            requirement_label: requirement.label.clone(),
            detected: true,
            count: confidences.len(),
            confidence: confidences.iter().copied().reduce(f64::max),
        },
        None => MatchResult {
            requirement_label: requirement.label.clone(),
            detected: false,
            count: 0,
            confidence: None,
        },
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirements(labels: &[&str]) -> Vec<Requirement> {
        labels.iter().copied().map(Requirement::new).collect()
    }

    #[test]
    fn test_determinism() {
        let requirements = requirements(&["chair", "table"]);
        let detections = vec![
            RawDetection::new("chair", 0.85, "img-1"),
            RawDetection::new("lamp", 0.42, "img-2"),
        ];

        let first = compute_progress_report(&requirements, &detections);
        let second = compute_progress_report(&requirements, &detections);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_requirements() {
        let detections = vec![RawDetection::new("chair", 0.9, "img-1")];

        let report = compute_progress_report(&[], &detections);

        assert_eq!(report.completion_percentage, 0.0);
        assert!(report.matches.is_empty());
        assert_eq!(report.total_objects_detected, 1);
        assert_eq!(report.unique_labels, vec!["chair".to_string()]);
        assert_eq!(report.average_confidence, 0.9);
    }

    #[test]
    fn test_no_detections() {
        let requirements = requirements(&["chair", "table"]);

        let report = compute_progress_report(&requirements, &[]);

        assert_eq!(report.completion_percentage, 0.0);
        assert_eq!(report.matches.len(), 2);
        for m in &report.matches {
            assert!(!m.detected);
            assert_eq!(m.count, 0);
            assert_eq!(m.confidence, None);
        }
        assert_eq!(report.total_objects_detected, 0);
        assert!(report.unique_labels.is_empty());
        assert_eq!(report.average_confidence, 0.0);
    }

    #[test]
    fn test_case_and_whitespace_insensitive_matching() {
        let requirements = requirements(&["Chair"]);
        let detections = vec![RawDetection::new(" chair ", 0.7, "img-1")];

        let report = compute_progress_report(&requirements, &detections);

        assert!(report.matches[0].detected);
        assert_eq!(report.matches[0].count, 1);
    }

    #[test]
    fn test_plural_matching() {
        let requirements = requirements(&["chair"]);
        let detections = vec![RawDetection::new("chairs", 0.7, "img-1")];

        let report = compute_progress_report(&requirements, &detections);
        assert!(report.matches[0].detected);
    }

    #[test]
    fn test_short_labels_do_not_collapse() {
        // "bus" keeps its trailing "s", so a "bu" requirement stays unmet.
        let requirements = requirements(&["bu"]);
        let detections = vec![RawDetection::new("bus", 0.7, "img-1")];

        let report = compute_progress_report(&requirements, &detections);
        assert!(!report.matches[0].detected);
    }

    #[test]
    fn test_confidence_is_max_of_matches() {
        let requirements = requirements(&["chair"]);
        let detections = vec![
            RawDetection::new("chair", 0.4, "img-1"),
            RawDetection::new("chair", 0.9, "img-2"),
        ];

        let report = compute_progress_report(&requirements, &detections);

        assert_eq!(report.matches[0].count, 2);
        assert_eq!(report.matches[0].confidence, Some(0.9));
    }

    #[test]
    fn test_unmatched_detections_only_reach_summary() {
        let requirements = requirements(&["chair", "table"]);
        let detections = vec![RawDetection::new("lamp", 0.8, "img-1")];

        let report = compute_progress_report(&requirements, &detections);

        assert_eq!(report.completion_percentage, 0.0);
        assert!(report.matches.iter().all(|m| m.count == 0));
        assert_eq!(report.total_objects_detected, 1);
        assert_eq!(report.unique_labels, vec!["lamp".to_string()]);
    }

    #[test]
    fn test_count_conservation_with_distinct_requirements() {
        let requirements = requirements(&["chair", "table"]);
        let detections = vec![
            RawDetection::new("chair", 0.9, "img-1"),
            RawDetection::new("table", 0.8, "img-1"),
            RawDetection::new("lamp", 0.7, "img-2"),
        ];

        let report = compute_progress_report(&requirements, &detections);

        let counted: usize = report.matches.iter().map(|m| m.count).sum();
        assert!(counted <= detections.len());
        assert_eq!(counted, 2);
    }

    #[test]
    fn test_out_of_range_confidence_is_clamped() {
        let requirements = requirements(&["chair"]);
        let detections = vec![
            RawDetection::new("chair", 1.7, "img-1"),
            RawDetection::new("chair", -0.3, "img-1"),
            RawDetection::new("chair", f64::NAN, "img-2"),
        ];

        let report = compute_progress_report(&requirements, &detections);

        assert_eq!(report.matches[0].confidence, Some(1.0));
        // (1.0 + 0.0 + 0.0) / 3
        assert_eq!(report.average_confidence, 0.333);
    }

    #[test]
    fn test_blank_labels_match_nothing_but_count_in_summary() {
        let requirements = requirements(&["chair"]);
        let detections = vec![
            RawDetection::new("   ", 0.6, "img-1"),
            RawDetection::new("chair", 0.8, "img-1"),
        ];

        let report = compute_progress_report(&requirements, &detections);

        assert_eq!(report.matches[0].count, 1);
        assert_eq!(report.total_objects_detected, 2);
        assert_eq!(report.average_confidence, 0.7);
        assert_eq!(
            report.unique_labels,
            vec!["   ".to_string(), "chair".to_string()]
        );
    }

    #[test]
    fn test_blank_requirement_never_matches_blank_detection() {
        let requirements = requirements(&[""]);
        let detections = vec![RawDetection::new("", 0.9, "img-1")];

        let report = compute_progress_report(&requirements, &detections);

        assert!(!report.matches[0].detected);
        assert_eq!(report.completion_percentage, 0.0);
        assert_eq!(report.total_objects_detected, 1);
    }

    #[test]
    fn test_duplicate_requirements_each_get_a_match_entry() {
        let requirements = requirements(&["chair", "Chairs"]);
        let detections = vec![RawDetection::new("chair", 0.9, "img-1")];

        let report = compute_progress_report(&requirements, &detections);

        assert_eq!(report.matches.len(), 2);
        assert!(report.matches.iter().all(|m| m.detected && m.count == 1));
        assert_eq!(report.completion_percentage, 100.0);
    }

    #[test]
    fn test_completion_rounding() {
        let requirements = requirements(&["chair", "table", "window"]);
        let detections = vec![
            RawDetection::new("chair", 0.85, "img-1"),
            RawDetection::new("table", 0.92, "img-2"),
        ];

        let report = compute_progress_report(&requirements, &detections);
        assert_eq!(report.completion_percentage, 66.67);
    }
}
