//! Manifest-backed detection provider
//!
//! Serves already-computed model output from JSON sidecar files instead of
//! running inference: the sidecar for `room.jpg` is `room.json` in the
//! manifest directory. Entries arrive in the loosely-typed upstream payload
//! shape and are coerced into strongly-typed records here, at the boundary,
//! so nothing downstream has to handle missing fields.

use crate::error::ScanError;
use crate::traits::DetectionProvider;
use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use sytescan_core::detection::{clamp_confidence, BBox, RawDetection};
use tracing::{debug, warn};

/// Loosely-typed manifest entry as emitted by an upstream detection run
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    #[serde(default, alias = "object_name", alias = "name")]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    /// `[x, y, width, height]`
    #[serde(default)]
    bbox: Option<[f64; 4]>,
}

/// Provider that reads precomputed detections from sidecar files
pub struct ManifestProvider {
    manifest_dir: PathBuf,
}

impl ManifestProvider {
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
        }
    }

    fn coerce(entry: ManifestEntry, source_image_id: &str, index: usize) -> Option<RawDetection> {
        let Some(label) = entry.label else {
            warn!(index, image = source_image_id, "manifest entry has no label, skipping");
            return None;
        };

        let confidence = match entry.confidence {
            Some(value) => clamp_confidence(value),
            None => {
                warn!(index, image = source_image_id, "manifest entry has no confidence, assuming 0");
                0.0
            }
        };

        let mut detection = RawDetection::new(label, confidence, source_image_id);
        if let Some([x, y, width, height]) = entry.bbox {
            detection = detection.with_bbox(BBox::new(x, y, width, height));
        }
        Some(detection)
    }
}

impl DetectionProvider for ManifestProvider {
    fn detect(&self, image: &Path) -> Result<Vec<RawDetection>> {
        let stem = image
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ScanError::MissingManifest(image.to_path_buf()))?;

        let manifest = self.manifest_dir.join(format!("{stem}.json"));
        if !manifest.exists() {
            return Err(ScanError::MissingManifest(manifest).into());
        }

        let raw = fs::read_to_string(&manifest)
            .with_context(|| format!("Failed to read manifest: {}", manifest.display()))?;
        let entries: Vec<ManifestEntry> =
            serde_json::from_str(&raw).map_err(|source| ScanError::MalformedManifest {
                path: manifest.clone(),
                source,
            })?;

        let detections: Vec<RawDetection> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| Self::coerce(entry, stem, index))
            .collect();

        debug!(image = stem, count = detections.len(), "loaded detections from manifest");
        Ok(detections)
    }
}
