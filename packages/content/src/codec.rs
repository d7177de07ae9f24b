//! Per-kind byte encodings.
//!
//! Decoding turns the bytes of a file into the [`Payload`] its kind carries;
//! encoding produces the canonical on-disk form:
//!
//! | Kind | Encoding |
//! |------|----------|
//! | text family | UTF-8 as-is |
//! | JSON | pretty-printed, two-space indent, keys in insertion order |
//! | YAML | block style |
//! | XML | declaration plus two-space indented elements |
//! | binary, image | raw bytes |

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::kind::{Kind, Shape};
use crate::payload::{Mapping, Payload};
use crate::xml::Element;

/// Anything a handle can hold and persist.
pub trait Content {
    /// The routing tag for this content.
    fn tag(&self) -> crate::payload::ContentTag;

    /// Canonical bytes for a file of `kind`.
    fn encode(&self, kind: Kind) -> Result<Vec<u8>, Error>;

    /// Human-readable rendering for a file of `kind`.
    fn display(&self, kind: Kind) -> Result<String, Error>;
}

/// Decode the bytes of `path` as `kind`.
pub fn decode(kind: Kind, bytes: Vec<u8>, path: &Path) -> Result<Payload, Error> {
    match kind.shape() {
        Shape::Text => String::from_utf8(bytes)
            .map(Payload::Text)
            .map_err(|e| Error::decode(path, kind, e)),
        Shape::Mapping if kind == Kind::Yaml => decode_yaml(&bytes, path).map(Payload::Mapping),
        Shape::Mapping => decode_json(&bytes, path).map(Payload::Mapping),
        Shape::Tree => Element::parse(&bytes)
            .map(Payload::Tree)
            .map_err(|message| Error::decode(path, kind, message)),
        Shape::Bytes => Ok(Payload::Bytes(Bytes::from(bytes))),
    }
}

fn decode_json(bytes: &[u8], path: &Path) -> Result<Mapping, Error> {
    let value: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| Error::decode(path, Kind::Json, e))?;
    match value {
        JsonValue::Object(mapping) => Ok(mapping),
        other => Err(Error::decode(
            path,
            Kind::Json,
            format!("expected an object at the document root, found {}", json_type(&other)),
        )),
    }
}

fn decode_yaml(bytes: &[u8], path: &Path) -> Result<Mapping, Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Mapping::new());
    }

    let value: JsonValue =
        serde_yaml::from_slice(bytes).map_err(|e| Error::decode(path, Kind::Yaml, e))?;
    match value {
        JsonValue::Null => Ok(Mapping::new()),
        JsonValue::Object(mapping) => Ok(mapping),
        other => Err(Error::decode(
            path,
            Kind::Yaml,
            format!("expected a mapping at the document root, found {}", json_type(&other)),
        )),
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

pub(crate) fn to_json_pretty<T: Serialize + ?Sized>(value: &T, kind: Kind) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::encode(kind, e))
}

pub(crate) fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_yaml::to_string(value).map_err(|e| Error::encode(Kind::Yaml, e))
}

fn mismatch(payload: &Payload, kind: Kind) -> Error {
    Error::TypeMismatch {
        supplied: payload.tag(),
        kind,
    }
}

impl Content for Payload {
    fn tag(&self) -> crate::payload::ContentTag {
        Payload::tag(self)
    }

    fn encode(&self, kind: Kind) -> Result<Vec<u8>, Error> {
        if self.shape() != kind.shape() {
            return Err(mismatch(self, kind));
        }

        match self {
            Payload::Text(text) => Ok(text.clone().into_bytes()),
            Payload::Mapping(mapping) if kind == Kind::Yaml => to_yaml(mapping).map(String::into_bytes),
            Payload::Mapping(mapping) => to_json_pretty(mapping, kind).map(String::into_bytes),
            Payload::Tree(element) => element
                .to_pretty_xml()
                .or_else(|pretty| {
                    log::debug!("Pretty XML failed ({}); writing plain XML", pretty);
                    element.to_xml()
                })
                .map_err(|e| Error::encode(kind, e)),
            Payload::Bytes(bytes) => Ok(bytes.to_vec()),
        }
    }

    fn display(&self, kind: Kind) -> Result<String, Error> {
        match self {
            Payload::Text(text) => Ok(text.clone()),
            Payload::Mapping(mapping) if kind == Kind::Yaml => to_yaml(mapping),
            Payload::Mapping(mapping) => to_json_pretty(mapping, kind),
            Payload::Tree(element) => element.display().map_err(|e| Error::encode(kind, e)),
            Payload::Bytes(bytes) => Ok(format!("Binary file, {} bytes", bytes.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Language;
    use serde_json::json;

    fn mapping(value: JsonValue) -> Mapping {
        match value {
            JsonValue::Object(mapping) => mapping,
            _ => panic!("not an object"),
        }
    }

    fn path() -> &'static Path {
        Path::new("doc")
    }

    #[test]
    fn json_decode_encode_decode_is_lossless() {
        let original = br#"{"zeta": 1, "alpha": {"list": [1, 2.5, "x"], "flag": true}, "none": null}"#;
        let first = decode(Kind::Json, original.to_vec(), path()).unwrap();
        let bytes = first.encode(Kind::Json).unwrap();
        let second = decode(Kind::Json, bytes, path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn json_encoding_is_two_space_and_keeps_key_order() {
        let payload = Payload::Mapping(mapping(json!({"b": 1, "a": [true]})));
        let text = String::from_utf8(payload.encode(Kind::Json).unwrap()).unwrap();
        assert_eq!(text, "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}");
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = decode(Kind::Json, b"{\"a\": ".to_vec(), path()).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("doc"));
    }

    #[test]
    fn json_root_must_be_an_object() {
        let err = decode(Kind::Json, b"[1, 2]".to_vec(), path()).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn yaml_decode_encode_decode_is_lossless() {
        let original = b"name: demo\nitems:\n  - 1\n  - two\nnested:\n  key: some text\n";
        let first = decode(Kind::Yaml, original.to_vec(), path()).unwrap();
        let bytes = first.encode(Kind::Yaml).unwrap();
        let second = decode(Kind::Yaml, bytes, path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_mapping().unwrap()["name"], json!("demo"));
    }

    #[test]
    fn yaml_encoding_is_block_style() {
        let payload = Payload::Mapping(mapping(json!({"a": {"b": [1, 2]}})));
        let text = String::from_utf8(payload.encode(Kind::Yaml).unwrap()).unwrap();
        assert!(text.starts_with("a:\n  b:\n"));
        assert!(text.contains("- 1\n"));
        assert!(!text.contains('{'));
        assert!(!text.contains('['));
    }

    #[test]
    fn empty_yaml_is_empty_mapping() {
        for source in [&b""[..], &b"   \n"[..], &b"~\n"[..], &b"null\n"[..]] {
            let payload = decode(Kind::Yaml, source.to_vec(), path()).unwrap();
            assert_eq!(payload, Payload::Mapping(Mapping::new()));
        }
    }

    #[test]
    fn malformed_yaml_is_a_decode_error() {
        let err = decode(Kind::Yaml, b"a: [1, 2\n".to_vec(), path()).unwrap_err();
        assert!(err.is_decode());
        let err = decode(Kind::Yaml, b"- just\n- a list\n".to_vec(), path()).unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn text_round_trips_verbatim() {
        let source = "line one\n  line two\n".as_bytes().to_vec();
        let payload = decode(Kind::Markdown, source.clone(), path()).unwrap();
        assert_eq!(payload.encode(Kind::Markdown).unwrap(), source);
    }

    #[test]
    fn invalid_utf8_text_is_a_decode_error() {
        let err = decode(Kind::Code(Language::Python), vec![0xff, 0xfe], path()).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn xml_decode_and_encode() {
        let payload = decode(Kind::Xml, b"<a x=\"1\"><b>t</b></a>".to_vec(), path()).unwrap();
        let bytes = payload.encode(Kind::Xml).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("<?xml"));
        assert_eq!(decode(Kind::Xml, bytes, path()).unwrap(), payload);
    }

    #[test]
    fn xml_mixed_content_survives_encode() {
        let source = b"<p>Hello <b>world</b> and  more</p>".to_vec();
        let first = decode(Kind::Xml, source, path()).unwrap();
        let bytes = first.encode(Kind::Xml).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("<p>Hello <b>world</b> and  more</p>"));
        assert_eq!(decode(Kind::Xml, bytes, path()).unwrap(), first);
    }

    #[test]
    fn malformed_xml_is_a_decode_error() {
        let err = decode(Kind::Xml, b"<a><b></a>".to_vec(), path()).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn binary_is_untouched() {
        let payload = decode(Kind::Binary, vec![0, 159, 146, 150], path()).unwrap();
        assert_eq!(payload.encode(Kind::Binary).unwrap(), vec![0, 159, 146, 150]);
        assert_eq!(payload.display(Kind::Binary).unwrap(), "Binary file, 4 bytes");
    }

    #[test]
    fn encode_rejects_mismatched_shape() {
        let err = Payload::from("text").encode(Kind::Json).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn display_renders_structured_content() {
        let payload = Payload::Mapping(mapping(json!({"k": "v"})));
        assert_eq!(payload.display(Kind::Json).unwrap(), "{\n  \"k\": \"v\"\n}");
        assert_eq!(payload.display(Kind::Yaml).unwrap(), "k: v\n");
    }
}
