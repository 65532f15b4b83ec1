//! Scan configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Operational limits for image ingest and detection handling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Detections below this confidence are discarded at ingest
    pub min_confidence: f64,
    /// Accepted image file extensions, lowercase, without the dot
    pub allowed_extensions: Vec<String>,
    /// Maximum size of a single image file in bytes
    pub max_file_size: u64,
    /// Maximum number of images accepted in one ingest batch
    pub max_batch_files: usize,
    pub upload_dir: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
            max_file_size: 10 * 1024 * 1024,
            max_batch_files: 10,
            upload_dir: "uploads/projects".into(),
        }
    }
}

impl ScanConfig {
    /// Whether a file extension is an accepted image format
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let config = ScanConfig::default();
        assert!(config.allows_extension("jpg"));
        assert!(config.allows_extension("JPG"));
        assert!(!config.allows_extension("gif"));
        assert!(!config.allows_extension(""));
    }
}
