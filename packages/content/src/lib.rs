//! contentfs Content Model
//!
//! Format-aware content for files on disk:
//! - `Kind`: the closed set of content categories, chosen by file extension
//! - `Payload`: untyped content (text, mapping, element tree or bytes)
//! - `Typed`: content validated against a caller's serde type
//! - `Handle`: one file's metadata and content, able to load and save itself
//! - `Format`: MIME type hint carried in metadata
//!
//! # Example
//!
//! ```rust
//! use contentfs_content::{kind_for, Kind};
//!
//! assert_eq!(kind_for(".JSON"), Kind::Json);
//! assert_eq!(kind_for("unknown"), Kind::Binary);
//! ```

pub use bytes::Bytes;

mod codec;
mod error;
mod format;
mod handle;
mod kind;
mod metadata;
mod payload;
pub mod schema;
pub mod xml;

pub use codec::{decode, Content};
pub use error::Error;
pub use format::Format;
pub use handle::{truncate_preview, Handle, TypedHandle, PREVIEW_LIMIT, TRUNCATION_MARKER};
pub use kind::{kind_for, kind_for_path, template, ImageFormat, Kind, Language, Shape};
pub use metadata::{Metadata, OwnerLookup};
pub use payload::{ContentTag, Mapping, Payload, Typed};
pub use xml::{Element, Node};
