//! In-memory payloads and the typed wrapper for schema-bound content.

use std::fmt;
use std::ops::{Deref, DerefMut};

use bytes::Bytes;

use crate::kind::{Kind, Shape};
use crate::xml::Element;

/// An insertion-ordered JSON-compatible mapping.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

/// Untyped content of a handle. The variant always matches the handle
/// kind's [`Shape`].
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Text(String),
    Mapping(Mapping),
    Tree(Element),
    Bytes(Bytes),
}

/// What a caller handed to the store, used to pick a storage route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentTag {
    Text,
    Mapping,
    Tree,
    Bytes,
    /// An instance of a caller-defined schema type.
    Typed,
}

impl Payload {
    /// The default payload for a file that does not exist yet.
    ///
    /// XML starts from an empty `root` element.
    pub fn empty(kind: Kind) -> Self {
        match kind.shape() {
            Shape::Text => Payload::Text(String::new()),
            Shape::Mapping => Payload::Mapping(Mapping::new()),
            Shape::Tree => Payload::Tree(Element::new("root")),
            Shape::Bytes => Payload::Bytes(Bytes::new()),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Payload::Text(_) => Shape::Text,
            Payload::Mapping(_) => Shape::Mapping,
            Payload::Tree(_) => Shape::Tree,
            Payload::Bytes(_) => Shape::Bytes,
        }
    }

    pub fn tag(&self) -> ContentTag {
        match self {
            Payload::Text(_) => ContentTag::Text,
            Payload::Mapping(_) => ContentTag::Mapping,
            Payload::Tree(_) => ContentTag::Tree,
            Payload::Bytes(_) => ContentTag::Bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Payload::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Element> {
        match self {
            Payload::Tree(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// True for an empty string, mapping, byte buffer, or a childless and
    /// attribute-free element.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Mapping(mapping) => mapping.is_empty(),
            Payload::Tree(element) => element.children.is_empty() && element.attributes.is_empty(),
            Payload::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Mapping> for Payload {
    fn from(mapping: Mapping) -> Self {
        Payload::Mapping(mapping)
    }
}

impl From<Element> for Payload {
    fn from(element: Element) -> Self {
        Payload::Tree(element)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl fmt::Display for ContentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentTag::Text => "text",
            ContentTag::Mapping => "mapping",
            ContentTag::Tree => "element tree",
            ContentTag::Bytes => "bytes",
            ContentTag::Typed => "typed",
        })
    }
}

/// A validated instance of a caller's schema type held by a handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Typed<T>(pub T);

impl<T> Typed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Typed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Typed<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
