use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use contentfs_content::schema;
use contentfs_content::{
    kind_for_path, ContentTag, Error as ContentError, Handle, Kind, OwnerLookup, Payload,
    TypedHandle,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::error::Error;
use crate::listing::{breadcrumbs, listing_order, Breadcrumb, DirectoryEntry};
use crate::path::Confinement;
use crate::route::{route, Route};

/// A file store confined to one root directory.
///
/// Every operation resolves its path beneath the root first, then picks
/// the content kind from the file extension.
#[derive(Clone, Debug)]
pub struct Store {
    confinement: Confinement,
    owners: OwnerLookup,
}

impl Store {
    /// Open a store at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Store, Error> {
        Store::from_config(&StoreConfig::new(root))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Store, Error> {
        let root = &config.root;
        if config.create_root {
            fs::create_dir_all(root).map_err(|e| Error::io(root, e))?;
        }

        let attr = fs::metadata(root).map_err(|e| Error::io(root, e))?;
        if !attr.is_dir() {
            return Err(Error::io(
                root,
                io::Error::other("Root path must be a directory."),
            ));
        }

        let canonical = root.canonicalize().map_err(|e| Error::io(root, e))?;
        let configured = std::path::absolute(root).unwrap_or_else(|_| root.clone());
        log::debug!("Opened store at {}", canonical.display());

        Ok(Store {
            confinement: Confinement::new(canonical, &configured),
            owners: OwnerLookup::probe(),
        })
    }

    pub fn root(&self) -> &Path {
        self.confinement.root()
    }

    /// Map `path` to an absolute path beneath the root.
    ///
    /// Confinement is lexical: a symlink inside the root that points outside
    /// it is still followed by the other operations.
    ///
    /// ```rust
    /// # let dir = tempfile::tempdir().unwrap();
    /// let store = contentfs_store::Store::new(dir.path()).unwrap();
    /// assert!(store.resolve("notes/today.md").unwrap().starts_with(store.root()));
    /// assert!(store.resolve("../../etc/passwd").unwrap_err().is_path_violation());
    /// ```
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, Error> {
        self.confinement.resolve(path.as_ref())
    }

    /// Load `path`. A missing file gives an empty handle of the path's kind.
    pub fn get(&self, path: impl AsRef<Path>) -> Result<Handle, Error> {
        let resolved = self.resolve(path)?;
        Ok(Handle::load(&resolved, self.owners)?)
    }

    /// Load `path` and validate its content against `T`.
    ///
    /// JSON and YAML mappings are validated directly; text files must hold
    /// JSON; XML is parsed straight into `T`. Other kinds cannot be
    /// validated.
    pub fn get_as<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<TypedHandle<T>, Error> {
        let resolved = self.resolve(path)?;
        if kind_for_path(&resolved) == Kind::Xml {
            return Ok(TypedHandle::load_xml(&resolved, self.owners)?);
        }

        let handle = Handle::load(&resolved, self.owners)?;
        let value = validate::<T>(handle.kind(), handle.payload())?;
        Ok(TypedHandle::from_parts(handle, value))
    }

    /// Write `content` to `path` and return the saved handle.
    ///
    /// Bytes are accepted for any path; other content must fit the kind
    /// the extension selects.
    pub fn set(&self, path: impl AsRef<Path>, content: impl Into<Payload>) -> Result<Handle, Error> {
        let resolved = self.resolve(path)?;
        let payload = content.into();
        let kind = kind_for_path(&resolved);
        let route = route(payload.tag(), kind)?;
        self.write_payload(&resolved, route.stored_kind(kind), payload)
    }

    /// Like [`set`](Store::set), but text, mappings and element trees must
    /// also validate against `T` before anything is written.
    pub fn set_as<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<Payload>,
    ) -> Result<Handle, Error> {
        let resolved = self.resolve(path)?;
        let payload = content.into();
        let kind = kind_for_path(&resolved);
        let route = route(payload.tag(), kind)?;

        match &payload {
            Payload::Text(text) => {
                schema::validate_text::<T>(text)?;
            }
            Payload::Mapping(mapping) => {
                schema::validate_mapping::<T>(mapping.clone())?;
            }
            Payload::Tree(element) => {
                schema::validate_tree::<T>(element)?;
            }
            Payload::Bytes(_) => {}
        }

        self.write_payload(&resolved, route.stored_kind(kind), payload)
    }

    /// Serialize `value` into `path` in the format its extension selects.
    pub fn set_typed<T: Serialize>(&self, path: impl AsRef<Path>, value: T) -> Result<TypedHandle<T>, Error> {
        let resolved = self.resolve(path)?;
        let kind = kind_for_path(&resolved);
        if route(ContentTag::Typed, kind)? == Route::Structured {
            let as_json = serde_json::to_value(&value).map_err(|e| ContentError::Encode {
                kind,
                message: e.to_string(),
            })?;
            if !as_json.is_object() {
                return Err(ContentError::TypeMismatch {
                    supplied: ContentTag::Typed,
                    kind,
                }
                .into());
            }
        }

        let mut handle = TypedHandle::typed(&resolved, value)?.with_owner_lookup(self.owners);
        handle.save()?;
        Ok(handle)
    }

    fn write_payload(&self, resolved: &Path, kind: Kind, payload: Payload) -> Result<Handle, Error> {
        let mut handle = Handle::with_kind(resolved, kind, payload)?.with_owner_lookup(self.owners);
        handle.save()?;
        Ok(handle)
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, Error> {
        Ok(self.resolve(path)?.exists())
    }

    /// Remove the file at `path`.
    ///
    /// Returns `false` when nothing was removed: the path is missing or is a
    /// directory.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<bool, Error> {
        let resolved = self.resolve(path)?;
        let attr = match fs::symlink_metadata(&resolved) {
            Ok(attr) => attr,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(Error::io(&resolved, err)),
        };

        if attr.is_dir() {
            log::debug!("Not deleting directory {}", resolved.display());
            return Ok(false);
        }

        log::debug!("Deleting {}...", resolved.display());
        fs::remove_file(&resolved).map_err(|e| Error::io(&resolved, e))?;
        Ok(true)
    }

    /// Files in `directory` (the root when `None`) matching `pattern`,
    /// relative to the root and sorted.
    ///
    /// Matching is not recursive: `*.md` sees only the directory itself and
    /// `*/*.md` one level below it.
    pub fn list_files(&self, directory: Option<&Path>, pattern: &str) -> Result<Vec<PathBuf>, Error> {
        let base = match directory {
            Some(directory) => self.resolve(directory)?,
            None => self.root().to_path_buf(),
        };
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let matcher = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|source| Error::Glob {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();
        let depth = pattern.split('/').filter(|s| !s.is_empty()).count().max(1);

        let mut files = Vec::new();
        let walker = walkdir::WalkDir::new(&base)
            .follow_links(true)
            .min_depth(1)
            .max_depth(depth);
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry under {}: {}", base.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let matched = path
                .strip_prefix(&base)
                .map(|relative| matcher.is_match(relative))
                .unwrap_or(false);
            if !matched {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(self.root()) {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    /// The entries of the directory at `path`, directories first.
    ///
    /// Files that fail to load are left out; a missing path or a file gives
    /// an empty listing.
    pub fn list_directory(&self, path: impl AsRef<Path>) -> Result<Vec<DirectoryEntry>, Error> {
        let resolved = self.resolve(path)?;
        if !resolved.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&resolved).map_err(|e| Error::io(&resolved, e))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry in {}: {}", resolved.display(), err);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_path = entry.path();
            // Follows symlinks, so a dangling link is skipped here.
            let attr = match fs::metadata(&entry_path) {
                Ok(attr) => attr,
                Err(err) => {
                    log::warn!("Skipping {}: {}", entry_path.display(), err);
                    continue;
                }
            };
            if attr.is_dir() {
                entries.push(DirectoryEntry::directory(name, entry_path));
                continue;
            }

            match Handle::load(&entry_path, self.owners) {
                Ok(handle) => entries.push(DirectoryEntry::file(name, handle)),
                Err(err) => log::warn!("Skipping {}: {}", entry_path.display(), err),
            }
        }

        entries.sort_by(listing_order);
        Ok(entries)
    }

    /// Navigation steps from `/` down to `path`.
    pub fn get_breadcrumbs(&self, path: impl AsRef<Path>) -> Result<Vec<Breadcrumb>, Error> {
        Ok(breadcrumbs(&self.resolve(path)?))
    }
}

fn validate<T: DeserializeOwned>(kind: Kind, payload: &Payload) -> Result<T, ContentError> {
    match payload {
        Payload::Mapping(mapping) if kind.is_structured() => schema::validate_mapping(mapping.clone()),
        Payload::Text(text) if kind.is_text_family() => schema::validate_text(text),
        _ => Err(ContentError::Validation {
            schema: schema::schema_name::<T>(),
            field: ".".to_string(),
            message: format!("{} files cannot be validated against a schema", kind),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentfs_content::{ImageFormat, Mapping};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        email: String,
    }

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path()).unwrap();
        (dir, store)
    }

    fn mapping(value: serde_json::Value) -> Mapping {
        match value {
            serde_json::Value::Object(mapping) => mapping,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn new_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("a/b/content");
        let store = Store::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root.canonicalize().unwrap());
    }

    #[test]
    fn from_config_without_create_requires_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("missing")).create_root(false);
        assert!(Store::from_config(&config).unwrap_err().is_io());
    }

    #[test]
    fn root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert!(Store::new(&file).unwrap_err().is_io());
    }

    #[test]
    fn absolute_paths_under_root_resolve() {
        let (dir, store) = store();
        let inside = dir.path().join("x.txt");
        assert_eq!(store.resolve(&inside).unwrap(), store.root().join("x.txt"));
        assert!(store.resolve("/").unwrap_err().is_path_violation());
    }

    #[test]
    fn get_missing_is_empty() {
        let (_dir, store) = store();
        let handle = store.get("nothing/here.md").unwrap();
        assert_eq!(handle.kind(), Kind::Markdown);
        assert_eq!(handle.payload(), &Payload::from(""));
        assert_eq!(handle.size(), 0);
        assert!(!store.exists("nothing/here.md").unwrap());
    }

    #[test]
    fn set_text_then_get() {
        let (_dir, store) = store();
        let saved = store.set("notes/a.txt", "hello").unwrap();
        assert_eq!(saved.size(), 5);
        assert!(store.exists("notes/a.txt").unwrap());
        assert_eq!(store.get("notes/a.txt").unwrap().payload(), &Payload::from("hello"));
    }

    #[test]
    fn set_mismatch_writes_nothing() {
        let (_dir, store) = store();
        let err = store.set("a.json", "not a mapping").unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(!store.exists("a.json").unwrap());
    }

    #[test]
    fn bytes_route_to_binary_or_image() {
        let (_dir, store) = store();
        let image = store.set("pic.png", vec![0x89u8, b'P', b'N', b'G']).unwrap();
        assert_eq!(image.kind(), Kind::Image(ImageFormat::Png));

        let blob = store.set("data.json", vec![1u8, 2, 3]).unwrap();
        assert_eq!(blob.kind(), Kind::Binary);
        assert_eq!(fs::read(blob.path()).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn set_as_validates_before_writing() {
        let (_dir, store) = store();
        let err = store
            .set_as::<Profile>("p.json", mapping(json!({"name": "Ada"})))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(!store.exists("p.json").unwrap());

        store
            .set_as::<Profile>("p.json", mapping(json!({"name": "Ada", "email": "a@b.c"})))
            .unwrap();
        assert!(store.exists("p.json").unwrap());

        let err = store.set_as::<Profile>("p.txt", "plain words").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn set_as_skips_validation_for_bytes() {
        let (_dir, store) = store();
        let handle = store.set_as::<Profile>("p.bin", vec![0u8; 4]).unwrap();
        assert_eq!(handle.size(), 4);
    }

    #[test]
    fn get_as_validates() {
        let (_dir, store) = store();
        store.set("p.json", mapping(json!({"name": "Ada"}))).unwrap();
        assert!(store.get_as::<Profile>("p.json").unwrap_err().is_validation());

        store
            .set("p.json", mapping(json!({"name": "Ada", "email": "a@b.c"})))
            .unwrap();
        let handle = store.get_as::<Profile>("p.json").unwrap();
        assert_eq!(handle.value().email, "a@b.c");
    }

    #[test]
    fn get_as_parses_text_as_json() {
        let (_dir, store) = store();
        store
            .set("p.md", r#"{"name": "Ada", "email": "a@b.c"}"#)
            .unwrap();
        assert_eq!(store.get_as::<Profile>("p.md").unwrap().value().name, "Ada");

        store.set("q.md", "# heading").unwrap();
        assert!(store.get_as::<Profile>("q.md").unwrap_err().is_validation());
    }

    #[test]
    fn get_as_rejects_binary_kinds() {
        let (_dir, store) = store();
        store.set("p.gif", vec![b'G', b'I', b'F']).unwrap();
        let err = store.get_as::<Profile>("p.gif").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("image"));
        assert!(err.to_string().contains("Profile"));
    }

    #[test]
    fn set_typed_per_kind() {
        let (_dir, store) = store();
        let profile = || Profile {
            name: "Ada".to_string(),
            email: "a@b.c".to_string(),
        };

        store.set_typed("p.yaml", profile()).unwrap();
        assert_eq!(store.get_as::<Profile>("p.yaml").unwrap().into_value(), profile());

        store.set_typed("p.xml", profile()).unwrap();
        assert_eq!(store.get_as::<Profile>("p.xml").unwrap().into_value(), profile());

        store.set_typed("p.txt", profile()).unwrap();
        assert_eq!(store.get_as::<Profile>("p.txt").unwrap().into_value(), profile());

        assert!(store.set_typed("p.jpg", profile()).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn set_typed_structured_needs_an_object() {
        let (_dir, store) = store();
        let err = store.set_typed("list.json", vec![1, 2, 3]).unwrap_err();
        assert!(err.is_type_mismatch());
        assert!(!store.exists("list.json").unwrap());
    }

    #[test]
    fn delete_files_only() {
        let (_dir, store) = store();
        store.set("d/a.txt", "x").unwrap();
        assert!(!store.delete("d").unwrap());
        assert!(store.exists("d").unwrap());
        assert!(store.delete("d/a.txt").unwrap());
        assert!(!store.delete("d/a.txt").unwrap());
    }

    #[test]
    fn deleted_handle_can_be_saved_again() {
        let (_dir, store) = store();
        let mut handle = store.set("a.txt", "x").unwrap();
        store.delete("a.txt").unwrap();
        handle.save().unwrap();
        assert!(store.exists("a.txt").unwrap());
    }

    #[test]
    fn list_files_is_not_recursive() {
        let (_dir, store) = store();
        store.set("a.md", "a").unwrap();
        store.set("b.md", "b").unwrap();
        store.set("c.txt", "c").unwrap();
        store.set("sub/d.md", "d").unwrap();

        let top = store.list_files(None, "*.md").unwrap();
        assert_eq!(top, [PathBuf::from("a.md"), PathBuf::from("b.md")]);

        let nested = store.list_files(None, "*/*.md").unwrap();
        assert_eq!(nested, [PathBuf::from("sub/d.md")]);

        let in_sub = store.list_files(Some(Path::new("sub")), "*").unwrap();
        assert_eq!(in_sub, [PathBuf::from("sub/d.md")]);
    }

    #[test]
    fn list_files_missing_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.list_files(Some(Path::new("nope")), "*").unwrap().is_empty());
        store.set("file.txt", "x").unwrap();
        assert!(store
            .list_files(Some(Path::new("file.txt")), "*")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn list_files_rejects_bad_pattern() {
        let (_dir, store) = store();
        assert!(matches!(
            store.list_files(None, "a[").unwrap_err(),
            Error::Glob { .. }
        ));
    }

    #[test]
    fn list_directory_skips_undecodable_files() {
        let (_dir, store) = store();
        store.set("good.json", mapping(json!({"k": 1}))).unwrap();
        fs::write(store.root().join("bad.json"), b"{ broken").unwrap();
        fs::create_dir(store.root().join("folder")).unwrap();

        let entries = store.list_directory("").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["folder", "good.json"]);
        assert!(entries[0].is_dir && entries[0].handle.is_none());
        assert!(entries[1].handle.is_some());
    }

    #[test]
    fn list_directory_missing_is_empty() {
        let (_dir, store) = store();
        assert!(store.list_directory("missing").unwrap().is_empty());
    }

    #[test]
    fn breadcrumbs_end_at_path() {
        let (_dir, store) = store();
        let crumbs = store.get_breadcrumbs("docs/guide").unwrap();
        assert_eq!(crumbs.first().unwrap().name, "root");
        let last = crumbs.last().unwrap();
        assert_eq!(last.name, "guide");
        assert_eq!(last.path, store.root().join("docs/guide"));
    }

    #[cfg(unix)]
    #[test]
    fn listings_agree_on_symlinks() {
        use std::os::unix::fs::symlink;

        let (_dir, store) = store();
        store.set("real.md", "body").unwrap();
        symlink(store.root().join("real.md"), store.root().join("alias.md")).unwrap();
        symlink(store.root().join("gone.md"), store.root().join("dangling.md")).unwrap();

        let files = store.list_files(None, "*.md").unwrap();
        assert_eq!(files, [PathBuf::from("alias.md"), PathBuf::from("real.md")]);

        let entries = store.list_directory("").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alias.md", "real.md"]);
        let alias = entries[0].handle.as_ref().unwrap();
        assert_eq!(alias.payload().as_text(), Some("body"));
        assert!(alias.is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_does_not_chase_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("secret.txt"), "s").unwrap();

        let store = Store::new(dir.path().join("root")).unwrap();
        std::os::unix::fs::symlink(&outside, store.root().join("link")).unwrap();

        let resolved = store.resolve("link/secret.txt").unwrap();
        assert_eq!(resolved, store.root().join("link/secret.txt"));
        assert_eq!(store.get("link/secret.txt").unwrap().payload().as_text(), Some("s"));
    }

    #[test]
    fn store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Store>();
    }
}
