//! Validation and coercion against caller-supplied schema types.
//!
//! A schema is any serde type. Structured content is validated by
//! deserializing it into the schema; failures report the field path where
//! the offending value sits.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::codec::{self, Content};
use crate::error::Error;
use crate::kind::Kind;
use crate::payload::{ContentTag, Mapping, Typed};
use crate::xml::{Element, XML_DECLARATION};

/// The name errors use for a schema type.
pub fn schema_name<T: ?Sized>() -> String {
    std::any::type_name::<T>().to_string()
}

fn validation<T: ?Sized>(field: impl Into<String>, message: impl ToString) -> Error {
    Error::Validation {
        schema: schema_name::<T>(),
        field: field.into(),
        message: message.to_string(),
    }
}

/// Validate a JSON value against `T`.
pub fn validate_value<T: DeserializeOwned>(value: JsonValue) -> Result<T, Error> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let field = err.path().to_string();
        validation::<T>(field, err.into_inner())
    })
}

/// Validate a decoded mapping against `T`.
pub fn validate_mapping<T: DeserializeOwned>(mapping: Mapping) -> Result<T, Error> {
    validate_value(JsonValue::Object(mapping))
}

/// Parse text as JSON, then validate it against `T`.
///
/// Text that is not JSON is a validation failure, never passed through.
pub fn validate_text<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| validation::<T>(".", format!("invalid JSON content: {}", e)))?;
    validate_value(value)
}

/// Validate an element tree against `T` by reading it back as XML.
pub fn validate_tree<T: DeserializeOwned>(element: &Element) -> Result<T, Error> {
    let bytes = element
        .to_xml()
        .map_err(|e| Error::encode(Kind::Xml, e))?;
    let text = String::from_utf8_lossy(&bytes);
    deserialize_xml(&text)
}

/// An instance of `T` built from no fields at all; fails when `T` has
/// required fields.
pub fn empty_instance<T: DeserializeOwned>() -> Result<T, Error> {
    validate_mapping(Mapping::new())
}

/// Parse XML bytes straight into `T`.
///
/// Bytes that are not well-formed XML are a decode error; well-formed XML
/// that does not fit `T` is a validation error.
pub fn decode_xml<T: DeserializeOwned>(bytes: &[u8], path: &Path) -> Result<T, Error> {
    Element::parse(bytes).map_err(|message| Error::decode(path, Kind::Xml, message))?;
    let text = std::str::from_utf8(bytes).map_err(|e| Error::decode(path, Kind::Xml, e))?;
    deserialize_xml(text)
}

fn deserialize_xml<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    let mut deserializer = quick_xml::de::Deserializer::from_str(text);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let field = err.path().to_string();
        validation::<T>(field, err.into_inner())
    })
}

/// Serialize `value` as an XML document named after its type.
pub fn to_xml<T: Serialize>(value: &T, declaration: bool) -> Result<String, Error> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    value
        .serialize(serializer)
        .map_err(|e| Error::encode(Kind::Xml, e))?;

    if !declaration {
        return Ok(body);
    }
    Ok(format!("{}\n{}\n", XML_DECLARATION, body))
}

impl<T: Serialize> Content for Typed<T> {
    fn tag(&self) -> ContentTag {
        ContentTag::Typed
    }

    fn encode(&self, kind: Kind) -> Result<Vec<u8>, Error> {
        let text = match kind {
            Kind::Json | Kind::Text | Kind::Markdown | Kind::Html | Kind::Code(_) => {
                codec::to_json_pretty(&self.0, kind)?
            }
            Kind::Yaml => codec::to_yaml(&self.0)?,
            Kind::Xml => to_xml(&self.0, true)?,
            Kind::Binary | Kind::Image(_) => {
                return Err(Error::TypeMismatch {
                    supplied: ContentTag::Typed,
                    kind,
                })
            }
        };
        Ok(text.into_bytes())
    }

    fn display(&self, kind: Kind) -> Result<String, Error> {
        match kind {
            Kind::Yaml => codec::to_yaml(&self.0),
            Kind::Xml => to_xml(&self.0, false),
            Kind::Binary | Kind::Image(_) => Err(Error::TypeMismatch {
                supplied: ContentTag::Typed,
                kind,
            }),
            _ => codec::to_json_pretty(&self.0, kind),
        }
    }
}
