//! Image ingest pipeline
//!
//! Validates uploaded images, runs the configured detection provider, and
//! persists the resulting detections. Detections below the configured
//! confidence floor are discarded; everything else is stored whether or not
//! it matches a requirement, so the progress report can account for objects
//! the user never asked about.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::store::ProjectStore;
use crate::traits::DetectionProvider;
use crate::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use sytescan_core::detection::{DetectionCollection, RawDetection};
use tracing::{error, info};

/// Result of ingesting a single image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub image_id: String,
    /// Detections stored for this image
    pub kept: usize,
    /// Detections dropped by the confidence floor
    pub discarded: usize,
}

/// Check that a file looks like an acceptable image upload
pub fn validate_image(path: &Path, config: &ScanConfig) -> Result<()> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !config.allows_extension(extension) {
        return Err(ScanError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        }
        .into());
    }

    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat image: {}", path.display()))?;
    if metadata.len() == 0 {
        return Err(ScanError::EmptyFile(path.to_path_buf()).into());
    }
    if metadata.len() > config.max_file_size {
        return Err(ScanError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: config.max_file_size,
        }
        .into());
    }

    Ok(())
}

/// Ingest one image: validate, detect, apply the confidence floor, persist
pub fn ingest_image(
    provider: &dyn DetectionProvider,
    store: &ProjectStore,
    project_id: &str,
    image: &Path,
    config: &ScanConfig,
) -> Result<IngestOutcome> {
    let detections = detect_one(provider, image, config)?;
    let outcome = persist_detections(store, project_id, image, detections, config)?;
    Ok(outcome)
}

/// Ingest several images, continuing past individual failures as long as the
/// batch itself is acceptable
pub fn ingest_batch(
    provider: &(dyn DetectionProvider + Sync),
    store: &ProjectStore,
    project_id: &str,
    images: &[PathBuf],
    config: &ScanConfig,
) -> Result<Vec<IngestOutcome>> {
    if images.is_empty() {
        return Err(ScanError::NoFiles.into());
    }
    if images.len() > config.max_batch_files {
        return Err(ScanError::TooManyFiles {
            given: images.len(),
            max: config.max_batch_files,
        }
        .into());
    }

    // Fail fast on an unknown project before touching any image
    store.load(project_id)?;

    let results: Vec<Result<Vec<RawDetection>>>;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        results = images
            .par_iter()
            .map(|image| detect_one(provider, image, config))
            .collect();
    }

    #[cfg(not(feature = "parallel"))]
    {
        results = images
            .iter()
            .map(|image| detect_one(provider, image, config))
            .collect();
    }

    // Detection may fan out, but the store is appended serially
    let mut outcomes = Vec::new();
    for (image, result) in images.iter().zip(results) {
        match result {
            Ok(detections) => {
                outcomes.push(persist_detections(store, project_id, image, detections, config)?);
            }
            Err(e) => {
                error!(image = %image.display(), error = %e, "skipping image");
            }
        }
    }

    Ok(outcomes)
}

fn detect_one(
    provider: &dyn DetectionProvider,
    image: &Path,
    config: &ScanConfig,
) -> Result<Vec<RawDetection>> {
    validate_image(image, config)?;
    provider
        .detect(image)
        .with_context(|| format!("Detection failed for {}", image.display()))
}

/// Copy a validated image into the project's upload directory
fn archive_image(image: &Path, project_id: &str, config: &ScanConfig) -> Result<()> {
    let dir = config.upload_dir.join(project_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create upload directory: {}", dir.display()))?;

    // validate_image has already rejected paths without a file name
    if let Some(file_name) = image.file_name() {
        let dest = dir.join(file_name);
        fs::copy(image, &dest)
            .with_context(|| format!("Failed to archive {}", image.display()))?;
    }
    Ok(())
}

fn persist_detections(
    store: &ProjectStore,
    project_id: &str,
    image: &Path,
    detections: Vec<RawDetection>,
    config: &ScanConfig,
) -> Result<IngestOutcome> {
    archive_image(image, project_id, config)?;

    let found = detections.len();
    let kept = detections
        .into_iter()
        .collect::<DetectionCollection>()
        .filter_by_confidence(config.min_confidence)
        .into_vec();

    let outcome = IngestOutcome {
        image_id: image_stem(image),
        kept: kept.len(),
        discarded: found - kept.len(),
    };

    store.append_detections(project_id, kept)?;
    info!(
        image = %outcome.image_id,
        kept = outcome.kept,
        discarded = outcome.discarded,
        "ingested image"
    );
    Ok(outcome)
}

fn image_stem(image: &Path) -> String {
    image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
