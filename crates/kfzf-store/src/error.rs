use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced while materializing a store to disk.
///
/// Every variant names the operation and the path it touched. None of them
/// invalidate the in-memory cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to determine home directory for default cache path")]
    MissingHomeDir,

    #[error("error creating directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error creating file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing to file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error flushing buffer for {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error syncing file {path}: {source}")]
    Sync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error moving file from {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// The path the failed operation was acting on (the rename destination for renames).
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            StoreError::MissingHomeDir => None,
            StoreError::CreateDir { path, .. }
            | StoreError::CreateFile { path, .. }
            | StoreError::Write { path, .. }
            | StoreError::Flush { path, .. }
            | StoreError::Sync { path, .. } => Some(path),
            StoreError::Rename { to, .. } => Some(to),
        }
    }
}
