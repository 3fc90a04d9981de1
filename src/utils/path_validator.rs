use crate::error::{Result, SyncError};
use crate::manifest::Manifest;
use std::path::{Path, PathBuf};

/// Directories a sync run refuses to treat as a project root.
const SYSTEM_DIRS: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

/// Path checks applied before the sync reads or writes anything.
pub struct PathValidator;

impl PathValidator {
    /// Canonicalises the project root. Files and system directories are refused.
    pub fn validate_project_root(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let root = canonical(path, "project directory")?;

        if !root.is_dir() {
            return Err(SyncError::ProjectValidation(format!(
                "Project path '{}' is not a directory",
                root.display()
            )));
        }

        if let Some(system) = SYSTEM_DIRS
            .iter()
            .map(Path::new)
            .find(|dir| path.starts_with(dir) || root.starts_with(dir))
        {
            return Err(SyncError::ProjectValidation(format!(
                "Refusing to sync inside system directory '{}'",
                system.display()
            )));
        }

        Ok(root)
    }

    /// Anchors the manifest at `root` and checks the roles directory and README
    /// exist and resolve inside it. The returned manifest holds the resolved
    /// paths, so a symlinked README is read and written at its target.
    pub fn validate_layout(root: &Path, manifest: Manifest) -> Result<Manifest> {
        let mut manifest = manifest.resolve(root);

        if !manifest.roles_dir.is_dir() {
            return Err(SyncError::ProjectValidation(format!(
                "Roles directory '{}' not found",
                manifest.roles_dir.display()
            )));
        }
        manifest.roles_dir = Self::validate_within(&manifest.roles_dir, root, "Roles directory")?;

        if !manifest.readme.is_file() {
            return Err(SyncError::ProjectValidation(format!(
                "README '{}' not found",
                manifest.readme.display()
            )));
        }
        manifest.readme = Self::validate_within(&manifest.readme, root, "README")?;

        Ok(manifest)
    }

    /// Resolves `path`, following symlinks, and requires it to sit inside `root`.
    pub fn validate_within(path: &Path, root: &Path, what: &str) -> Result<PathBuf> {
        let resolved = canonical(path, what)?;
        let root = canonical(root, "project directory")?;

        if !resolved.starts_with(&root) {
            return Err(SyncError::ProjectValidation(format!(
                "{} '{}' resolves outside the project directory",
                what,
                path.display()
            )));
        }

        Ok(resolved)
    }
}

fn canonical(path: &Path, what: &str) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        SyncError::ProjectValidation(format!("Invalid {} '{}': {e}", what, path.display()))
    })
}
