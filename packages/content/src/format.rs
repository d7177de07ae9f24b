//! MIME-style format hints for stored content.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

/// The MIME type a piece of content is stored as.
///
/// Every [`Kind`](crate::Kind) maps to exactly one format. Formats are plain
/// MIME strings so rendering collaborators can pass them straight into a
/// `Content-Type` header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Format(pub Cow<'static, str>);

impl Format {
    /// Plain text (`text/plain`)
    pub const TEXT: Format = Format(Cow::Borrowed("text/plain"));

    /// Markdown (`text/markdown`)
    pub const MARKDOWN: Format = Format(Cow::Borrowed("text/markdown"));

    /// HTML (`text/html`)
    pub const HTML: Format = Format(Cow::Borrowed("text/html"));

    /// Python source (`text/x-python`)
    pub const PYTHON: Format = Format(Cow::Borrowed("text/x-python"));

    /// Stylesheets (`text/css`)
    pub const CSS: Format = Format(Cow::Borrowed("text/css"));

    /// JavaScript source (`application/javascript`)
    pub const JAVASCRIPT: Format = Format(Cow::Borrowed("application/javascript"));

    /// JSON (`application/json`)
    pub const JSON: Format = Format(Cow::Borrowed("application/json"));

    /// YAML (`application/yaml`)
    pub const YAML: Format = Format(Cow::Borrowed("application/yaml"));

    /// XML (`application/xml`)
    pub const XML: Format = Format(Cow::Borrowed("application/xml"));

    /// Opaque binary data (`application/octet-stream`)
    pub const OCTET_STREAM: Format = Format(Cow::Borrowed("application/octet-stream"));

    pub const JPEG: Format = Format(Cow::Borrowed("image/jpeg"));
    pub const PNG: Format = Format(Cow::Borrowed("image/png"));
    pub const GIF: Format = Format(Cow::Borrowed("image/gif"));
    pub const SVG: Format = Format(Cow::Borrowed("image/svg+xml"));

    /// Create a format from a static string.
    pub const fn from_static(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }

    /// Create a format from an owned string.
    pub fn new(s: impl Into<String>) -> Self {
        Format(Cow::Owned(s.into()))
    }

    /// Get the format string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is an `image/*` format.
    pub fn is_image(&self) -> bool {
        self.0.starts_with("image/")
    }

    /// Check if this is a `text/*` format.
    pub fn is_text(&self) -> bool {
        self.0.starts_with("text/")
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::OCTET_STREAM
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Format {
    fn from(s: &'static str) -> Self {
        Format(Cow::Borrowed(s))
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format(Cow::Owned(s))
    }
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
