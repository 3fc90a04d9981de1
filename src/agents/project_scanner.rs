use crate::error::Result;
use crate::manifest::Manifest;
use crate::utils::PathValidator;
use std::path::{Path, PathBuf};

/// ProjectScannerAgent checks that the README and the roles directory exist
/// before the sync reads anything.
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Validates the project layout and anchors the manifest at the project root.
    pub fn validate(&self, manifest: Manifest) -> Result<ProjectInfo> {
        let project_root = PathValidator::validate_project_root(&self.project_path)?;
        let manifest = PathValidator::validate_layout(&project_root, manifest)?;

        Ok(ProjectInfo {
            project_path: project_root,
            manifest,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_path: PathBuf,
    pub manifest: Manifest,
}
