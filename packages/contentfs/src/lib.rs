//! contentfs: a typed, file-backed content store.
//!
//! Paths map to format-aware content. The file extension decides how bytes
//! are decoded and encoded (text, Markdown, HTML, code, JSON, YAML, XML,
//! binary and images), and content can be validated against any serde type
//! on the way in or out. All paths are confined beneath one root directory.
//!
//! This crate re-exports the two layers:
//! - [`content`]: kinds, payloads, codecs and handles
//! - [`store`]: the root-confined [`Store`]

pub use contentfs_content as content;
pub use contentfs_store as store;

pub use contentfs_content::{
    kind_for, ContentTag, Element, Format, Handle, Kind, Mapping, Metadata, Payload, Typed,
    TypedHandle,
};
pub use contentfs_store::{Breadcrumb, DirectoryEntry, Error, Store, StoreConfig};
