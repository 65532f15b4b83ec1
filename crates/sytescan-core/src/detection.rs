//! Raw detection records and collection operations
//!
//! Core representation of what the detection provider reported for a
//! project's uploaded images.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clamp a provider confidence into `[0, 1]`; NaN becomes `0.0`.
///
/// Applied wherever confidences enter an aggregate so a misbehaving
/// provider cannot corrupt averages or maxima.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Axis-aligned bounding box in image pixel coordinates
///
/// Retained for display only; progress comparison never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Calculate area of the bounding box
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// One object instance reported by the detection provider in one uploaded image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub confidence: f64,
    pub bbox: Option<BBox>,
    pub source_image_id: String,
}

impl RawDetection {
    /// Create a new detection without display geometry
    pub fn new(
        label: impl Into<String>,
        confidence: f64,
        source_image_id: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox: None,
            source_image_id: source_image_id.into(),
        }
    }

    /// Attach display geometry
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Collection of raw detections with batch operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionCollection {
    detections: Vec<RawDetection>,
}

impl DetectionCollection {
    /// Create new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of detections
    pub fn from_vec(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }

    /// Add a detection to the collection
    pub fn push(&mut self, detection: RawDetection) {
        self.detections.push(detection);
    }

    /// Extend with another collection
    pub fn extend(&mut self, other: DetectionCollection) {
        self.detections.extend(other.detections);
    }

    /// Get detections as slice
    pub fn as_slice(&self) -> &[RawDetection] {
        &self.detections
    }

    /// Consume the collection into its detections
    pub fn into_vec(self) -> Vec<RawDetection> {
        self.detections
    }

    /// Get number of detections
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Sort by confidence (descending)
    pub fn sort_by_confidence(&mut self) {
        self.detections
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    }

    /// Filter by confidence threshold
    pub fn filter_by_confidence(mut self, threshold: f64) -> Self {
        self.detections
            .retain(|detection| detection.confidence >= threshold);
        self
    }

    /// Get statistics
    pub fn stats(&self) -> DetectionStats {
        let mut label_counts: HashMap<String, usize> = HashMap::new();
        let mut total_confidence = 0.0;
        let mut max_confidence: f64 = 0.0;
        let mut min_confidence = f64::INFINITY;

        for detection in &self.detections {
            *label_counts.entry(detection.label.clone()).or_insert(0) += 1;
            let confidence = clamp_confidence(detection.confidence);
            total_confidence += confidence;
            max_confidence = max_confidence.max(confidence);
            min_confidence = min_confidence.min(confidence);
        }

        let avg_confidence = if self.detections.is_empty() {
            0.0
        } else {
            total_confidence / self.detections.len() as f64
        };

        DetectionStats {
            total_detections: self.detections.len(),
            label_counts,
            avg_confidence,
            max_confidence,
            min_confidence: if min_confidence == f64::INFINITY {
                0.0
            } else {
                min_confidence
            },
        }
    }

    /// Convert to iterator
    pub fn iter(&self) -> std::slice::Iter<'_, RawDetection> {
        self.detections.iter()
    }
}

impl IntoIterator for DetectionCollection {
    type Item = RawDetection;
    type IntoIter = std::vec::IntoIter<RawDetection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}

impl FromIterator<RawDetection> for DetectionCollection {
    fn from_iter<T: IntoIterator<Item = RawDetection>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// Statistics about a collection of detections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total_detections: usize,
    pub label_counts: HashMap<String, usize>,
    pub avg_confidence: f64,
    pub max_confidence: f64,
    pub min_confidence: f64,
}
