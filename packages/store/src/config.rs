//! Store configuration.

use std::ffi::OsString;
use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable naming the store root.
pub const ROOT_ENV: &str = "CONTENTFS_ROOT";

/// Root used when [`ROOT_ENV`] is unset.
pub const DEFAULT_ROOT: &str = "./content";

/// How to build a [`Store`](crate::Store).
///
/// Deserializable so callers can embed it in their own configuration:
///
/// ```rust
/// use contentfs_store::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"root": "/srv/notes"}"#).unwrap();
/// assert!(config.create_root);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    pub root: PathBuf,
    /// Create the root (and its parents) when it does not exist.
    #[serde(default = "default_create_root")]
    pub create_root: bool,
}

fn default_create_root() -> bool {
    true
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_root: true,
        }
    }

    /// Root from `CONTENTFS_ROOT`, falling back to `./content`.
    pub fn from_env() -> Self {
        Self::from_root_var(std::env::var_os(ROOT_ENV))
    }

    fn from_root_var(value: Option<OsString>) -> Self {
        match value {
            Some(root) if !root.is_empty() => Self::new(root),
            _ => Self::new(DEFAULT_ROOT),
        }
    }

    #[must_use]
    pub fn create_root(mut self, create: bool) -> Self {
        self.create_root = create;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}
