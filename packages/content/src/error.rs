//! Error types for the content layer.

use std::io;
use std::path::{Path, PathBuf};

use crate::format::Format;
use crate::kind::Kind;
use crate::payload::ContentTag;

/// Errors raised while decoding, encoding, validating or persisting content.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Bytes on disk are not valid in the kind's format.
    #[error("decode error ({format}) in {}: {message}", .path.display())]
    Decode {
        path: PathBuf,
        format: Format,
        message: String,
    },

    /// A payload could not be serialized for its kind.
    #[error("encode error ({kind}): {message}")]
    Encode { kind: Kind, message: String },

    /// Content does not fit the requested schema type.
    #[error("validation against {schema} failed at `{field}`: {message}")]
    Validation {
        schema: String,
        field: String,
        message: String,
    },

    /// The supplied content cannot be stored as the resolved kind.
    #[error("{supplied} content is not compatible with {kind} files")]
    TypeMismatch { supplied: ContentTag, kind: Kind },

    /// Filesystem failure.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn decode(path: &Path, kind: Kind, message: impl ToString) -> Self {
        Error::Decode {
            path: path.to_path_buf(),
            format: kind.format(),
            message: message.to_string(),
        }
    }

    pub(crate) fn encode(kind: Kind, message: impl ToString) -> Self {
        Error::Encode {
            kind,
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}
