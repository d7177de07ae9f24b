//! Lexical path normalization and root confinement.

use std::path::{Component, Path, PathBuf};

use crate::error::Error;

/// Collapse `.` and `..` without touching the filesystem.
///
/// Returns `None` when a `..` would climb above the start of a relative
/// path or above the root of an absolute one.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normal = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normal.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                normal.pop();
                depth -= 1;
            }
            Component::Normal(segment) => {
                normal.push(segment);
                depth += 1;
            }
        }
    }

    Some(normal)
}

/// A root directory and the rules for mapping caller paths beneath it.
#[derive(Clone, Debug)]
pub struct Confinement {
    /// Canonical root; every resolved path starts with it.
    root: PathBuf,
    /// The root as configured, before symlinks were resolved.
    configured: Option<PathBuf>,
}

impl Confinement {
    pub fn new(root: PathBuf, configured: &Path) -> Self {
        let configured = normalize(configured).filter(|c| c.is_absolute() && *c != root);
        Self { root, configured }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `input` to an absolute path under the root.
    ///
    /// Relative inputs are joined to the root. Absolute inputs must already
    /// lie under the root, compared component by component.
    pub fn resolve(&self, input: &Path) -> Result<PathBuf, Error> {
        let violation = || Error::PathViolation {
            path: input.to_path_buf(),
            root: self.root.clone(),
        };

        let normal = normalize(input).ok_or_else(violation)?;
        if !normal.is_absolute() {
            return Ok(self.root.join(normal));
        }

        if normal.starts_with(&self.root) {
            return Ok(normal);
        }
        if let Some(configured) = &self.configured {
            if let Ok(rest) = normal.strip_prefix(configured) {
                return Ok(self.root.join(rest));
            }
        }
        Err(violation())
    }
}
