//! Directory listing and navigation projections.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use contentfs_content::Handle;
use serde::Serialize;

/// One entry of a directory listing.
#[derive(Clone, Debug)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// The loaded file. Always `None` for directories.
    pub handle: Option<Handle>,
}

impl DirectoryEntry {
    pub fn directory(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            handle: None,
        }
    }

    pub fn file(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            path: handle.path().to_path_buf(),
            is_dir: false,
            handle: Some(handle),
        }
    }
}

/// Directories first, then files; each group by case-folded name with the
/// exact name breaking ties.
pub fn listing_order(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// A navigation step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: PathBuf,
}

/// A `root` step for `/`, then one step per segment of `path`, each
/// carrying the path up to and including that segment.
pub fn breadcrumbs(path: &Path) -> Vec<Breadcrumb> {
    let mut crumbs = Vec::new();
    let mut current = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => current.push(prefix.as_os_str()),
            Component::RootDir => {
                current.push(component.as_os_str());
                crumbs.push(Breadcrumb {
                    name: "root".to_string(),
                    path: current.clone(),
                });
            }
            Component::Normal(segment) => {
                current.push(segment);
                crumbs.push(Breadcrumb {
                    name: segment.to_string_lossy().into_owned(),
                    path: current.clone(),
                });
            }
            Component::CurDir | Component::ParentDir => {}
        }
    }

    crumbs
}
