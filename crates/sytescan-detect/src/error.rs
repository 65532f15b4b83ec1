//! Error taxonomy for the detection boundary

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store, providers, and the ingest pipeline
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("project {0} not found")]
    ProjectNotFound(String),

    #[error("no files provided")]
    NoFiles,

    #[error("too many files: {given} given, maximum {max}")]
    TooManyFiles { given: usize, max: usize },

    #[error("{} has unsupported format {extension:?}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("{} is too large: {size} bytes, maximum {max}", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("{} is empty", .0.display())]
    EmptyFile(PathBuf),

    #[error("no detection manifest found for {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("malformed detection manifest {}", .path.display())]
    MalformedManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
