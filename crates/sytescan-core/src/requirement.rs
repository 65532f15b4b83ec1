//! Project requirements
//!
//! A requirement is a user-declared object label expected to be present in
//! the project's space. Requirements are created with the project and kept
//! in insertion order; the progress report carries one match entry per
//! requirement in that same order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

use crate::label::normalize;

/// A single expected object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub label: String,
}

impl Requirement {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Load a requirement list from a plain text file, one label per line.
    ///
    /// Blank lines are skipped and order is preserved. Labels that collide
    /// after normalization are kept (each gets its own match entry) but
    /// flagged, since they will always rise and fall together.
    pub fn load_list<P: AsRef<Path>>(path: P) -> Result<Vec<Requirement>> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut requirements = Vec::new();
        let mut seen = HashSet::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read line {} from {}", line_num + 1, path.display())
            })?;

            let label = line.trim();
            if label.is_empty() {
                continue;
            }

            if !seen.insert(normalize(label)) {
                warn!(
                    line = line_num + 1,
                    label, "requirement duplicates an earlier one after normalization"
                );
            }

            requirements.push(Requirement::new(label));
        }

        Ok(requirements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_list() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("requirements.txt");
        let mut file = File::create(&path)?;
        writeln!(file, "chair")?;
        writeln!(file)?;
        writeln!(file, "  dining table  ")?;
        writeln!(file, "Chairs")?;

        let requirements = Requirement::load_list(&path)?;

        assert_eq!(
            requirements,
            vec![
                Requirement::new("chair"),
                Requirement::new("dining table"),
                Requirement::new("Chairs"),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_load_list_missing_file() {
        let result = Requirement::load_list("does/not/exist.txt");
        assert!(result.is_err());
    }
}
