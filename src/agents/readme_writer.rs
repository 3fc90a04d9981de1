use crate::error::{Result, SyncError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persists the patched README by writing a sibling temp file and renaming it
/// over the original, so a failed write never leaves a truncated README.
/// A symlinked README keeps its link; the file it points at is replaced.
pub struct ReadmeWriter {
    readme_path: PathBuf,
}

impl ReadmeWriter {
    pub fn new<P: AsRef<Path>>(readme_path: P) -> Self {
        Self {
            readme_path: readme_path.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, content: &str) -> Result<()> {
        // Rename onto the link target, not the link.
        let resolved = fs::canonicalize(&self.readme_path).ok();
        let path = resolved.as_ref().unwrap_or(&self.readme_path);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| SyncError::write(path, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SyncError::write(path, e))?;

        // Temp files are created 0600; keep whatever mode the README had.
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(tmp.path(), metadata.permissions())
                .map_err(|e| SyncError::write(path, e))?;
        }

        tmp.persist(path).map_err(|e| SyncError::write(path, e.error))?;
        Ok(())
    }
}
