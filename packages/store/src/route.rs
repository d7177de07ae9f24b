//! Which storage route a write takes, given what was supplied and the kind
//! the target path selects.

use contentfs_content::{ContentTag, Error as ContentError, Kind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    /// A string into a text-family file.
    Text,
    /// A mapping into a JSON or YAML file.
    Structured,
    /// An element tree into an XML file.
    Tree,
    /// Raw bytes, stored as a binary file whatever the extension.
    Binary,
    /// Raw bytes into an image file, keeping the image kind.
    Image,
    /// A typed value rendered as JSON text.
    JsonText,
    /// A typed value serialized as XML.
    SchemaXml,
}

impl Route {
    /// The kind the written handle carries.
    pub(crate) fn stored_kind(self, kind: Kind) -> Kind {
        match self {
            Route::Binary => Kind::Binary,
            _ => kind,
        }
    }
}

pub(crate) fn route(supplied: ContentTag, kind: Kind) -> Result<Route, ContentError> {
    let route = match (supplied, kind) {
        (
            ContentTag::Text,
            Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_),
        ) => Some(Route::Text),
        (ContentTag::Text, Kind::Json | Kind::Yaml | Kind::Xml | Kind::Binary | Kind::Image(_)) => None,

        (ContentTag::Mapping, Kind::Json | Kind::Yaml) => Some(Route::Structured),
        (
            ContentTag::Mapping,
            Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_) | Kind::Xml | Kind::Binary | Kind::Image(_),
        ) => None,

        (ContentTag::Tree, Kind::Xml) => Some(Route::Tree),
        (
            ContentTag::Tree,
            Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_) | Kind::Json | Kind::Yaml | Kind::Binary | Kind::Image(_),
        ) => None,

        (ContentTag::Bytes, Kind::Image(_)) => Some(Route::Image),
        (
            ContentTag::Bytes,
            Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_) | Kind::Json | Kind::Yaml | Kind::Xml | Kind::Binary,
        ) => Some(Route::Binary),

        (ContentTag::Typed, Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_)) => Some(Route::JsonText),
        (ContentTag::Typed, Kind::Json | Kind::Yaml) => Some(Route::Structured),
        (ContentTag::Typed, Kind::Xml) => Some(Route::SchemaXml),
        (ContentTag::Typed, Kind::Binary | Kind::Image(_)) => None,
    };

    route.ok_or(ContentError::TypeMismatch { supplied, kind })
}
