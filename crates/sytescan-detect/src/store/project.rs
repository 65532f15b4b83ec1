//! File-backed project store
//!
//! One pretty-printed JSON document per project under the store root.
//! Progress reports are never persisted: they are recomputed from the
//! stored requirements and detections on every read.

use crate::error::ScanError;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use sytescan_core::{compute_progress_report, ProgressReport, RawDetection, Requirement};
use tracing::info;
use uuid::Uuid;

/// A project with its requirement list and accumulated detections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProject {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub requirements: Vec<Requirement>,
    pub detections: Vec<RawDetection>,
}

impl StoredProject {
    /// Recompute the progress report from current data
    pub fn report(&self) -> ProgressReport {
        compute_progress_report(&self.requirements, &self.detections)
    }
}

/// Directory-backed store, one JSON file per project id
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create store directory: {}", root.display()))?;
        Ok(Self { root })
    }

    fn project_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Create and persist a new project
    pub fn create(
        &self,
        name: impl Into<String>,
        requirements: Vec<Requirement>,
    ) -> Result<StoredProject> {
        let project = StoredProject {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            requirements,
            detections: Vec::new(),
        };
        self.save(&project)?;
        info!(id = %project.id, name = %project.name, "created project");
        Ok(project)
    }

    /// Load a project by id
    pub fn load(&self, id: &str) -> Result<StoredProject> {
        let path = self.project_path(id);
        if !path.exists() {
            return Err(ScanError::ProjectNotFound(id.to_string()).into());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let project = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse project file: {}", path.display()))?;
        Ok(project)
    }

    /// Persist a project, overwriting any previous state
    pub fn save(&self, project: &StoredProject) -> Result<()> {
        let json = serde_json::to_string_pretty(project).context("Failed to serialize project")?;
        let path = self.project_path(&project.id);
        fs::write(&path, json)
            .with_context(|| format!("Failed to write project file: {}", path.display()))?;
        Ok(())
    }

    /// Append detections produced for one image and persist
    pub fn append_detections(
        &self,
        id: &str,
        detections: Vec<RawDetection>,
    ) -> Result<StoredProject> {
        let mut project = self.load(id)?;
        let added = detections.len();
        project.detections.extend(detections);
        self.save(&project)?;
        info!(id, added, total = project.detections.len(), "stored detections");
        Ok(project)
    }

    /// List project ids present in the store, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read store directory: {}", self.root.display()))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_load_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ProjectStore::open(dir.path())?;

        let created = store.create(
            "Office refit",
            vec![Requirement::new("chair"), Requirement::new("table")],
        )?;
        let loaded = store.load(&created.id)?;

        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.name, "Office refit");
        assert_eq!(loaded.requirements, created.requirements);
        assert!(loaded.detections.is_empty());
        Ok(())
    }

    #[test]
    fn test_append_detections_accumulates() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ProjectStore::open(dir.path())?;
        let project = store.create("Site", vec![Requirement::new("chair")])?;

        store.append_detections(
            &project.id,
            vec![RawDetection::new("chair", 0.85, "room-1")],
        )?;
        let updated = store.append_detections(
            &project.id,
            vec![RawDetection::new("chair", 0.9, "room-2")],
        )?;

        assert_eq!(updated.detections.len(), 2);

        let report = store.load(&project.id)?.report();
        assert_eq!(report.completion_percentage, 100.0);
        assert_eq!(report.matches[0].count, 2);
        assert_eq!(report.matches[0].confidence, Some(0.9));
        Ok(())
    }

    #[test]
    fn test_load_unknown_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();

        let err = store.load("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::ProjectNotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_list_is_sorted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = ProjectStore::open(dir.path())?;

        let a = store.create("A", Vec::new())?;
        let b = store.create("B", Vec::new())?;

        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(store.list()?, expected);
        Ok(())
    }
}
