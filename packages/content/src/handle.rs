//! Content handles: one file's metadata plus its in-memory content.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::codec::{self, Content};
use crate::error::Error;
use crate::format::Format;
use crate::kind::{kind_for_path, Kind};
use crate::metadata::{Metadata, OwnerLookup};
use crate::payload::{ContentTag, Payload, Typed};
use crate::schema;

/// Longest preview, in characters, before truncation.
pub const PREVIEW_LIMIT: usize = 10_240;

/// Appended to a preview that was cut short.
pub const TRUNCATION_MARKER: &str = "\n... (content truncated)";

/// A file's metadata and content.
///
/// The kind is fixed by the path's extension when the handle is created.
/// Handles hold no reference to a store; they load and save themselves.
#[derive(Clone, Debug)]
pub struct Handle<C = Payload> {
    filename: String,
    path: PathBuf,
    kind: Kind,
    metadata: Metadata,
    owners: OwnerLookup,
    content: C,
}

/// A handle whose content was validated against the schema type `T`.
pub type TypedHandle<T> = Handle<Typed<T>>;

impl<C> Handle<C> {
    fn from_content(path: &Path, kind: Kind, content: C) -> Self {
        Self {
            filename: filename_of(path),
            path: path.to_path_buf(),
            kind,
            metadata: Metadata::empty(kind.format()),
            owners: OwnerLookup::default(),
            content,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    /// Mutable access to the content. Metadata is stale until the next
    /// [`save`](Handle::save).
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    pub fn into_content(self) -> C {
        self.content
    }

    pub fn template_name(&self) -> &'static str {
        self.kind.template_name()
    }

    /// The path's extension as written, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }

    pub fn size(&self) -> u64 {
        self.metadata.size
    }

    pub fn modified(&self) -> DateTime<Utc> {
        self.metadata.modified
    }

    pub fn mime_type(&self) -> &Format {
        &self.metadata.mime_type
    }

    pub fn is_symlink(&self) -> bool {
        fs::symlink_metadata(&self.path)
            .map(|stat| stat.file_type().is_symlink())
            .unwrap_or(false)
    }

    /// A symlink whose target does not exist.
    pub fn is_broken_symlink(&self) -> bool {
        self.is_symlink() && fs::metadata(&self.path).is_err()
    }

    /// Resolve owner and group on the next load or save with `owners`.
    #[must_use]
    pub fn with_owner_lookup(mut self, owners: OwnerLookup) -> Self {
        self.owners = owners;
        self
    }

    /// Replace the content, keeping path, kind and metadata.
    pub fn try_map_content<D, E>(self, f: impl FnOnce(C) -> Result<D, E>) -> Result<Handle<D>, E> {
        let content = f(self.content)?;
        Ok(Handle {
            filename: self.filename,
            path: self.path,
            kind: self.kind,
            metadata: self.metadata,
            owners: self.owners,
            content,
        })
    }

    fn refresh_metadata(&mut self) -> Result<(), Error> {
        let stat = fs::metadata(&self.path).map_err(|e| Error::io(&self.path, e))?;
        self.metadata = Metadata::from_stat(&stat, self.kind.format(), self.owners);
        Ok(())
    }

    fn persist(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        log::debug!("Writing {} ({} bytes)...", self.path.display(), bytes.len());
        fs::write(&self.path, bytes).map_err(|e| Error::io(&self.path, e))?;
        self.refresh_metadata()
    }
}

impl<C: Content> Handle<C> {
    /// Encode the content for this handle's kind and write it, creating
    /// parent directories. Metadata is refreshed only after a successful
    /// write.
    pub fn save(&mut self) -> Result<(), Error> {
        let bytes = self.content.encode(self.kind)?;
        self.persist(&bytes)
    }

    /// Full human-readable rendering of the content.
    pub fn display_content(&self) -> Result<String, Error> {
        self.content.display(self.kind)
    }

    /// The display rendering cut to [`PREVIEW_LIMIT`] characters.
    pub fn preview_content(&self) -> Result<String, Error> {
        self.display_content().map(truncate_preview)
    }
}

impl Handle<Payload> {
    /// A handle for `path` holding `payload`, not yet written.
    ///
    /// Fails when the payload's shape does not fit the kind the extension
    /// selects.
    pub fn new(path: impl AsRef<Path>, payload: Payload) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::with_kind(path, kind_for_path(path), payload)
    }

    /// Like [`new`](Handle::new), but stores the payload as `kind` whatever
    /// the extension says. Raw bytes written to a `.json` path are kept as
    /// [`Kind::Binary`] this way.
    pub fn with_kind(path: impl AsRef<Path>, kind: Kind, payload: Payload) -> Result<Self, Error> {
        let path = path.as_ref();
        if payload.shape() != kind.shape() {
            return Err(Error::TypeMismatch {
                supplied: payload.tag(),
                kind,
            });
        }
        Ok(Self::from_content(path, kind, payload))
    }

    /// A handle with the kind's empty payload and zero-valued metadata.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let kind = kind_for_path(path);
        Self::from_content(path, kind, Payload::empty(kind))
    }

    /// Read and decode `path`. A missing file gives an empty handle.
    pub fn load(path: impl AsRef<Path>, owners: OwnerLookup) -> Result<Self, Error> {
        let path = path.as_ref();
        let kind = kind_for_path(path);

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} does not exist, using empty {} content", path.display(), kind);
                return Ok(Self::empty(path).with_owner_lookup(owners));
            }
            Err(err) => return Err(Error::io(path, err)),
        };

        log::debug!("Read {} ({} bytes) as {}", path.display(), bytes.len(), kind);
        let payload = codec::decode(kind, bytes, path)?;
        let mut handle = Self::from_content(path, kind, payload).with_owner_lookup(owners);
        handle.refresh_metadata()?;
        Ok(handle)
    }

    pub fn payload(&self) -> &Payload {
        &self.content
    }

    /// Replace the payload. The shape must still fit the kind.
    pub fn set_payload(&mut self, payload: Payload) -> Result<(), Error> {
        if payload.shape() != self.kind.shape() {
            return Err(Error::TypeMismatch {
                supplied: payload.tag(),
                kind: self.kind,
            });
        }
        self.content = payload;
        Ok(())
    }
}

impl<T> Handle<Typed<T>> {
    /// A schema-bound handle for `path` holding `value`, not yet written.
    ///
    /// Binary and image files cannot hold typed values.
    pub fn typed(path: impl AsRef<Path>, value: T) -> Result<Self, Error> {
        let path = path.as_ref();
        let kind = kind_for_path(path);
        if kind.is_binary() {
            return Err(Error::TypeMismatch {
                supplied: ContentTag::Typed,
                kind,
            });
        }
        Ok(Self::from_content(path, kind, Typed(value)))
    }

    /// Rebind a loaded handle to a value validated from its payload.
    pub fn from_parts(handle: Handle<Payload>, value: T) -> Self {
        Handle {
            filename: handle.filename,
            path: handle.path,
            kind: handle.kind,
            metadata: handle.metadata,
            owners: handle.owners,
            content: Typed(value),
        }
    }

    pub fn value(&self) -> &T {
        &self.content.0
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.content.0
    }

    pub fn set_value(&mut self, value: T) {
        self.content = Typed(value);
    }

    pub fn into_value(self) -> T {
        self.content.0
    }
}

impl<T: DeserializeOwned> Handle<Typed<T>> {
    /// Parse an XML file straight into `T`.
    ///
    /// A missing file yields `T` built from no fields, which fails
    /// validation when `T` has required fields.
    pub fn load_xml(path: impl AsRef<Path>, owners: OwnerLookup) -> Result<Self, Error> {
        let path = path.as_ref();
        let kind = kind_for_path(path);

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("{} does not exist, building empty instance", path.display());
                let value = schema::empty_instance::<T>()?;
                return Ok(Self::from_content(path, kind, Typed(value)).with_owner_lookup(owners));
            }
            Err(err) => return Err(Error::io(path, err)),
        };

        log::debug!("Read {} ({} bytes) as schema-bound xml", path.display(), bytes.len());
        let value = schema::decode_xml::<T>(&bytes, path)?;
        let mut handle = Self::from_content(path, kind, Typed(value)).with_owner_lookup(owners);
        handle.refresh_metadata()?;
        Ok(handle)
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Cut `text` to [`PREVIEW_LIMIT`] characters, appending
/// [`TRUNCATION_MARKER`] when anything was dropped.
pub fn truncate_preview(text: String) -> String {
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((end, _)) => {
            let mut preview = text;
            preview.truncate(end);
            preview.push_str(TRUNCATION_MARKER);
            preview
        }
        None => text,
    }
}
