//! The closed set of content kinds and the extension registry.

use std::fmt;
use std::path::Path;

use crate::format::Format;

/// Source languages that share the code presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Css,
    JavaScript,
}

/// Image encodings the store recognises by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
}

/// The category governing how a file is decoded, encoded and displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Text,
    Markdown,
    Html,
    Code(Language),
    Json,
    Yaml,
    Xml,
    Binary,
    Image(ImageFormat),
}

/// The payload shape a kind carries in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A UTF-8 string.
    Text,
    /// An insertion-ordered key/value mapping.
    Mapping,
    /// An XML element tree.
    Tree,
    /// Raw bytes.
    Bytes,
}

/// Presentation template tags handed to rendering collaborators.
pub mod template {
    pub const TEXT: &str = "file_previews/txt.html";
    pub const MARKDOWN: &str = "file_previews/md.html";
    pub const CODE: &str = "file_previews/code.html";
    pub const JSON: &str = "file_previews/json.html";
    pub const IMAGE: &str = "file_previews/image.html";
    pub const UNKNOWN: &str = "file_previews/unknown.html";
}

/// Map a file extension to its kind.
///
/// The lookup is case-insensitive and tolerates a leading dot. Anything the
/// registry does not know is [`Kind::Binary`].
///
/// ```rust
/// use contentfs_content::{kind_for, Kind};
///
/// assert_eq!(kind_for("JSON"), Kind::Json);
/// assert_eq!(kind_for(".yml"), Kind::Yaml);
/// assert_eq!(kind_for("exe"), Kind::Binary);
/// ```
pub fn kind_for(extension: &str) -> Kind {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    match extension.as_str() {
        "txt" => Kind::Text,
        "md" => Kind::Markdown,
        "html" | "htm" => Kind::Html,
        "py" => Kind::Code(Language::Python),
        "css" => Kind::Code(Language::Css),
        "js" => Kind::Code(Language::JavaScript),
        "json" => Kind::Json,
        "yaml" | "yml" => Kind::Yaml,
        "xml" => Kind::Xml,
        "jpg" | "jpeg" => Kind::Image(ImageFormat::Jpeg),
        "png" => Kind::Image(ImageFormat::Png),
        "gif" => Kind::Image(ImageFormat::Gif),
        "svg" => Kind::Image(ImageFormat::Svg),
        _ => Kind::Binary,
    }
}

/// Map a path to its kind by extension. Paths without a (UTF-8) extension
/// are binary.
pub fn kind_for_path(path: &Path) -> Kind {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(kind_for)
        .unwrap_or(Kind::Binary)
}

impl Kind {
    /// The MIME type content of this kind is stored as.
    pub fn format(self) -> Format {
        match self {
            Kind::Text => Format::TEXT,
            Kind::Markdown => Format::MARKDOWN,
            Kind::Html => Format::HTML,
            Kind::Code(Language::Python) => Format::PYTHON,
            Kind::Code(Language::Css) => Format::CSS,
            Kind::Code(Language::JavaScript) => Format::JAVASCRIPT,
            Kind::Json => Format::JSON,
            Kind::Yaml => Format::YAML,
            Kind::Xml => Format::XML,
            Kind::Binary => Format::OCTET_STREAM,
            Kind::Image(ImageFormat::Jpeg) => Format::JPEG,
            Kind::Image(ImageFormat::Png) => Format::PNG,
            Kind::Image(ImageFormat::Gif) => Format::GIF,
            Kind::Image(ImageFormat::Svg) => Format::SVG,
        }
    }

    /// The in-memory payload shape.
    pub fn shape(self) -> Shape {
        match self {
            Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_) => Shape::Text,
            Kind::Json | Kind::Yaml => Shape::Mapping,
            Kind::Xml => Shape::Tree,
            Kind::Binary | Kind::Image(_) => Shape::Bytes,
        }
    }

    /// The presentation template tag. Opaque to the store.
    pub fn template_name(self) -> &'static str {
        match self {
            Kind::Text | Kind::Html | Kind::Binary => template::TEXT,
            Kind::Markdown => template::MARKDOWN,
            Kind::Code(_) => template::CODE,
            Kind::Json => template::JSON,
            Kind::Yaml | Kind::Xml => template::UNKNOWN,
            Kind::Image(_) => template::IMAGE,
        }
    }

    /// Text, Markdown, HTML and code.
    pub fn is_text_family(self) -> bool {
        self.shape() == Shape::Text
    }

    /// JSON and YAML.
    pub fn is_structured(self) -> bool {
        self.shape() == Shape::Mapping
    }

    /// Binary and images.
    pub fn is_binary(self) -> bool {
        self.shape() == Shape::Bytes
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Text => "text",
            Kind::Markdown => "markdown",
            Kind::Html => "html",
            Kind::Code(Language::Python) => "python",
            Kind::Code(Language::Css) => "css",
            Kind::Code(Language::JavaScript) => "javascript",
            Kind::Json => "json",
            Kind::Yaml => "yaml",
            Kind::Xml => "xml",
            Kind::Binary => "binary",
            Kind::Image(_) => "image",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Text => "text",
            Shape::Mapping => "mapping",
            Shape::Tree => "element tree",
            Shape::Bytes => "bytes",
        })
    }
}
