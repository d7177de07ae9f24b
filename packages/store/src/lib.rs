//! contentfs Store Layer
//!
//! A [`Store`] confines every operation to one root directory and picks
//! each file's content kind from its extension:
//! - `get` / `get_as`: load a file, optionally validating it against a serde type
//! - `set` / `set_as` / `set_typed`: route content to the right encoding and write it
//! - `exists`, `delete`, `list_files`, `list_directory`, `get_breadcrumbs`
//!
//! # Example
//!
//! ```rust
//! use contentfs_store::Store;
//!
//! # let dir = tempfile::tempdir().unwrap();
//! let store = Store::new(dir.path())?;
//! store.set("notes/today.md", "# Today")?;
//! assert_eq!(store.get("notes/today.md")?.payload().as_text(), Some("# Today"));
//! # Ok::<(), contentfs_store::Error>(())
//! ```

mod config;
mod error;
mod listing;
mod path;
mod route;
mod store;

pub use config::{StoreConfig, DEFAULT_ROOT, ROOT_ENV};
pub use error::Error;
pub use listing::{Breadcrumb, DirectoryEntry};
pub use path::normalize;
pub use store::Store;
