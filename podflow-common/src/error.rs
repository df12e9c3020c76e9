//! Common error types for podflow

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Common result type for podflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across podflow crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error on a named path
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map an I/O failure on `path`, keeping missing files distinct
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.display().to_string())
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}
