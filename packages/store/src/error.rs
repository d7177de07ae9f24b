//! Error types for the store layer.

use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by [`Store`](crate::Store) operations.
///
/// Content-level failures (decode, validation, type mismatch) pass through
/// unchanged in [`Error::Content`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path {} resolves outside the store root {}", .path.display(), .root.display())]
    PathViolation { path: PathBuf, root: PathBuf },

    #[error(transparent)]
    Content(#[from] contentfs_content::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid listing pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl Error {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_path_violation(&self) -> bool {
        matches!(self, Error::PathViolation { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Content(e) if e.is_validation())
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Content(e) if e.is_decode())
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::Content(e) if e.is_type_mismatch())
    }

    /// Filesystem failures from either layer.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io { .. } => true,
            Error::Content(e) => e.is_io(),
            _ => false,
        }
    }
}
