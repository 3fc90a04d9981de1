use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Failed to {action} '{}': {source}", .path.display())]
    FileAccess {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(String),

    #[error("README is out of date: {0} key(s) differ from role defaults")]
    OutOfDate(usize),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SyncError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::FileAccess {
            action: "read",
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::FileAccess {
            action: "write",
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
