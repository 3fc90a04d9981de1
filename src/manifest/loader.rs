use crate::error::{Result, SyncError};
use crate::manifest::{DependencyDescriptor, Manifest};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Manifest picked up from the project root when no `--config` is given.
pub const MANIFEST_FILE_NAME: &str = "readme-sync.toml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    roles_dir: Option<PathBuf>,
    readme: Option<PathBuf>,
    #[serde(default, rename = "dependency")]
    dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DependencyEntry {
    key: String,
    file: PathBuf,
}

/// Builds the run [`Manifest`] from built-in defaults, an optional TOML file
/// and command line overrides.
pub struct ManifestLoader {
    project_root: PathBuf,
    config: Option<PathBuf>,
    readme: Option<PathBuf>,
    roles_dir: Option<PathBuf>,
}

impl ManifestLoader {
    pub fn new<P: AsRef<Path>>(project_root: P) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            config: None,
            readme: None,
            roles_dir: None,
        }
    }

    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.config = config;
        self
    }

    pub fn with_readme(mut self, readme: Option<PathBuf>) -> Self {
        self.readme = readme;
        self
    }

    pub fn with_roles_dir(mut self, roles_dir: Option<PathBuf>) -> Self {
        self.roles_dir = roles_dir;
        self
    }

    /// Returns the manifest file that will be read, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(explicit) => Some(self.project_root.join(explicit)),
            None => {
                let implicit = self.project_root.join(MANIFEST_FILE_NAME);
                implicit.is_file().then_some(implicit)
            }
        }
    }

    /// Loads and validates the manifest. Paths stay relative to the project root.
    pub fn load(&self) -> Result<Manifest> {
        let mut manifest = match self.config_path() {
            Some(path) => Self::read_file(&path)?,
            None => Manifest::default(),
        };

        if let Some(readme) = &self.readme {
            manifest.readme = readme.clone();
        }
        if let Some(roles_dir) = &self.roles_dir {
            manifest.roles_dir = roles_dir.clone();
        }

        validate(&manifest)?;
        Ok(manifest)
    }

    fn read_file(path: &Path) -> Result<Manifest> {
        let content = fs::read_to_string(path).map_err(|e| SyncError::read(path, e))?;
        parse_manifest(&content).map_err(|e| match e {
            SyncError::Toml(err) => {
                SyncError::Manifest(format!("Failed to parse '{}': {}", path.display(), err))
            }
            other => other,
        })
    }
}

/// Parses manifest TOML, falling back to built-in values for omitted fields.
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let file: ManifestFile = toml::from_str(content)?;
    let defaults = Manifest::default();

    let dependencies = if file.dependencies.is_empty() {
        defaults.dependencies
    } else {
        file.dependencies
            .into_iter()
            .map(|entry| DependencyDescriptor::new(entry.key, entry.file))
            .collect()
    };

    Ok(Manifest {
        roles_dir: file.roles_dir.unwrap_or(defaults.roles_dir),
        readme: file.readme.unwrap_or(defaults.readme),
        dependencies,
    })
}

/// Checks the invariants the pipeline relies on: a non-empty set of unique
/// keys, each backed by a file that stays inside the roles directory.
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.dependencies.is_empty() {
        return Err(SyncError::Manifest(
            "At least one dependency must be declared".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for descriptor in &manifest.dependencies {
        let key = descriptor.key.trim();
        if key.is_empty() {
            return Err(SyncError::Manifest("Dependency key cannot be empty".to_string()));
        }
        if key != descriptor.key {
            return Err(SyncError::Manifest(format!(
                "Dependency key '{}' has surrounding whitespace",
                descriptor.key
            )));
        }
        if !seen.insert(key) {
            return Err(SyncError::Manifest(format!(
                "Dependency key '{}' is declared more than once",
                key
            )));
        }

        let escapes = descriptor.file.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || descriptor.file.as_os_str().is_empty() {
            return Err(SyncError::Manifest(format!(
                "File '{}' for key '{}' must be a relative path inside the roles directory",
                descriptor.file.display(),
                key
            )));
        }
    }

    Ok(())
}
