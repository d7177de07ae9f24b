//! Untyped XML element trees.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Declaration written at the top of every persisted XML document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A child of an [`Element`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
///
/// Whitespace-only text between elements is not kept, so a tree survives a
/// pretty-printed write and re-read unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text nodes.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Parse a document with exactly one root element.
    pub fn parse(bytes: &[u8]) -> Result<Element, String> {
        let mut reader = Reader::from_reader(bytes);

        let mut buf = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;
            match event {
                Event::Start(start) => open.push(start_element(&start)?),
                Event::Empty(start) => {
                    let element = start_element(&start)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| "closing tag without an open element".to_string())?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    push_text(&mut open, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_text(&mut open, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes.
                _ => {}
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            return Err(format!("unclosed element <{}>", unclosed.name));
        }
        root.ok_or_else(|| "document has no root element".to_string())
    }

    /// Serialize with an XML declaration, indenting two spaces per level.
    pub fn to_pretty_xml(&self) -> Result<Vec<u8>, String> {
        let mut bytes = self.write(Writer::new_with_indent(Vec::new(), b' ', 2))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Serialize with an XML declaration and no added whitespace.
    pub fn to_xml(&self) -> Result<Vec<u8>, String> {
        self.write(Writer::new(Vec::new()))
    }

    /// Pretty text for display, falling back to plain serialization.
    pub fn display(&self) -> Result<String, String> {
        let bytes = match self.to_pretty_xml() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("Pretty-printing <{}> failed, using plain XML: {}", self.name, e);
                self.to_xml()?
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, mut writer: Writer<Vec<u8>>) -> Result<Vec<u8>, String> {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| e.to_string())?;
        write_element(&mut writer, self)?;
        Ok(writer.into_inner())
    }
}

fn start_element(start: &BytesStart) -> Result<Element, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| e.to_string())?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), String> {
    match open.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!("unexpected second root element <{}>", element.name)),
    }
}

fn push_text(open: &mut [Element], text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let parent = open
        .last_mut()
        .ok_or_else(|| "text outside of the root element".to_string())?;
    // Text split by a comment or CDATA section is one node.
    match parent.children.last_mut() {
        Some(Node::Text(previous)) => previous.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), String> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| e.to_string());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| e.to_string())?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| e.to_string())?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("library")
            .with_attribute("owner", "ada")
            .with_child(
                Element::new("book")
                    .with_attribute("id", "1")
                    .with_text("Notes & Queries"),
            )
            .with_child(Element::new("shelf"))
    }

    #[test]
    fn parse_builds_tree() {
        let xml = br#"<?xml version="1.0"?>
            <library owner="ada">
              <book id="1">Notes &amp; Queries</book>
              <shelf/>
            </library>"#;
        let root = Element::parse(xml).unwrap();
        assert_eq!(root, sample());
        assert_eq!(root.attribute("owner"), Some("ada"));
        assert_eq!(root.child("book").unwrap().text(), "Notes & Queries");
        assert_eq!(root.elements().count(), 2);
    }

    #[test]
    fn pretty_output_has_declaration_and_indent() {
        let text = String::from_utf8(sample().to_pretty_xml().unwrap()).unwrap();
        assert!(text.starts_with(XML_DECLARATION));
        assert!(text.contains("\n  <book id=\"1\">Notes &amp; Queries</book>"));
        assert!(text.contains("\n  <shelf/>"));
        assert!(text.ends_with("</library>\n"));
    }

    #[test]
    fn pretty_output_reparses_to_same_tree() {
        let tree = sample();
        let reparsed = Element::parse(&tree.to_pretty_xml().unwrap()).unwrap();
        assert_eq!(reparsed, tree);

        let plain = Element::parse(&tree.to_xml().unwrap()).unwrap();
        assert_eq!(plain, tree);
    }

    #[test]
    fn empty_root_is_self_closing() {
        let text = String::from_utf8(Element::new("root").to_xml().unwrap()).unwrap();
        assert!(text.ends_with("<root/>"));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(Element::parse(b"<a><b></a>").is_err());
        assert!(Element::parse(b"<a>").is_err());
        assert!(Element::parse(b"").is_err());
        assert!(Element::parse(b"<a/><b/>").is_err());
        assert!(Element::parse(b"stray <a/>").is_err());
    }

    #[test]
    fn cdata_becomes_text() {
        let root = Element::parse(b"<a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(root.text(), "x < y");
    }

    #[test]
    fn mixed_content_keeps_its_spacing() {
        let tree = Element::parse(b"<p>Hello <b>world</b> and  more</p>").unwrap();
        assert_eq!(
            tree.children,
            vec![
                Node::Text("Hello ".to_string()),
                Node::Element(Element::new("b").with_text("world")),
                Node::Text(" and  more".to_string()),
            ]
        );

        let pretty = tree.to_pretty_xml().unwrap();
        assert!(String::from_utf8_lossy(&pretty).contains("<p>Hello <b>world</b> and  more</p>"));
        assert_eq!(Element::parse(&pretty).unwrap(), tree);
        assert_eq!(Element::parse(&tree.to_xml().unwrap()).unwrap(), tree);
    }

    #[test]
    fn text_keeps_leading_and_trailing_whitespace() {
        let tree = Element::parse(b"<code>  indented\n  body  </code>").unwrap();
        assert_eq!(tree.text(), "  indented\n  body  ");
    }

    #[test]
    fn text_around_comments_is_one_node() {
        let tree = Element::parse(b"<a>one <!-- note --> two</a>").unwrap();
        assert_eq!(tree.children, vec![Node::Text("one  two".to_string())]);
    }

    #[test]
    fn display_is_pretty() {
        let shown = sample().display().unwrap();
        assert!(shown.contains("\n  <shelf/>"));
    }
}
