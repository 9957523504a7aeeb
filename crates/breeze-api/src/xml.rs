//! A small owned XML element tree.
//!
//! Responses are parsed once with quick-xml into [`XmlNode`]s, which the
//! status resolver splits and the marshaller binds to records. Fragments are
//! written back without a prolog and without namespace declarations.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{ApiError, ApiResult};

/// An XML element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    text: String,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// Parses a document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed XML or a document without a root.
    pub fn parse(xml: &str) -> ApiResult<Self> {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                ApiError::parse(format!(
                    "malformed XML at position {}: {e}",
                    reader.buffer_position()
                ))
                .with_source(e)
            })?;

            match event {
                Event::Start(e) => stack.push(start_node(&e)?),
                Event::Empty(e) => {
                    let node = start_node(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| ApiError::parse("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(e) => {
                    if let Some(top) = stack.last_mut() {
                        let text = e.unescape().map_err(|err| {
                            ApiError::parse("invalid character data").with_source(err)
                        })?;
                        top.text.push_str(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(ApiError::parse("unexpected end of document"));
        }
        root.ok_or_else(|| ApiError::parse("document has no root element"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn into_children(self) -> Vec<XmlNode> {
        self.children
    }

    /// Text content directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(XmlNode::text)
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All elements below this one with the given name, in document order.
    pub fn descendants(&self, name: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_named(name, &mut found);
        }
        found
    }

    /// This element or the first element below it with the given name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Follows a `/`-separated path of child names from this element.
    ///
    /// `select("shortcuts/sco")` returns every `sco` child of every
    /// `shortcuts` child, in document order.
    pub fn select(&self, path: &str) -> Vec<&XmlNode> {
        let mut current = vec![self];
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|node| node.children_named(segment))
                .collect();
        }
        current
    }

    /// Serializes this element as a fragment.
    ///
    /// No XML declaration is written and `xmlns` attributes are dropped.
    pub fn to_fragment(&self) -> ApiResult<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| ApiError::decode("XML fragment is not UTF-8").with_source(e))
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> ApiResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(write_error);
        }

        writer.write_event(Event::Start(start)).map_err(write_error)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(write_error)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(write_error)
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlNode>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.collect_named(name, found);
        }
    }
}

fn write_error<E>(err: E) -> ApiError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ApiError::decode("failed to write XML fragment").with_source(err)
}

fn start_node(e: &BytesStart<'_>) -> ApiResult<XmlNode> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ApiError::parse("malformed attribute").with_source(err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| ApiError::parse(format!("invalid value for `{key}`")).with_source(err))?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> ApiResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(ApiError::parse("document has more than one root element")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<results>
  <status code="ok"/>
  <shortcuts>
    <sco tree-id="1" sco-id="10" type="meetings"><domain-name>https://a</domain-name></sco>
    <sco tree-id="2" sco-id="20" type="content"><domain-name>https://b</domain-name></sco>
  </shortcuts>
</results>"#;

    #[test]
    fn parses_tree() {
        let root = XmlNode::parse(DOC).unwrap();
        assert_eq!(root.name(), "results");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.child("status").unwrap().attribute("code"), Some("ok"));
    }

    #[test]
    fn select_follows_path() {
        let root = XmlNode::parse(DOC).unwrap();
        let scos = root.select("shortcuts/sco");
        assert_eq!(scos.len(), 2);
        assert_eq!(scos[0].attribute("sco-id"), Some("10"));
        assert_eq!(scos[1].child_text("domain-name"), Some("https://b"));
    }

    #[test]
    fn descendants_in_document_order() {
        let root = XmlNode::parse(DOC).unwrap();
        let ids: Vec<_> = root
            .descendants("sco")
            .iter()
            .filter_map(|n| n.attribute("tree-id"))
            .collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(root.find("domain-name").unwrap().text(), "https://a");
    }

    #[test]
    fn unescapes_text_and_attributes() {
        let node = XmlNode::parse(r#"<a title="x &amp; y">1 &lt; 2</a>"#).unwrap();
        assert_eq!(node.attribute("title"), Some("x & y"));
        assert_eq!(node.text(), "1 < 2");
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        for doc in ["", "<a>", "<a></b>", "<a/><b/>", "not xml at all"] {
            let err = XmlNode::parse(doc).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "{doc:?}");
        }
    }

    #[test]
    fn fragment_has_no_prolog_or_namespaces() {
        let node = XmlNode::new("sco")
            .with_attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
            .with_attribute("xmlns", "urn:x")
            .with_attribute("sco-id", "7")
            .with_child(XmlNode::new("name").with_text("Q&A"))
            .with_child(XmlNode::new("description"));
        insta::assert_snapshot!(node.to_fragment().unwrap(), @r#"<sco sco-id="7"><name>Q&amp;A</name><description/></sco>"#);
    }

    #[test]
    fn set_attribute_replaces() {
        let mut node = XmlNode::new("a").with_attribute("k", "1");
        node.set_attribute("k", "2");
        assert_eq!(node.attributes().len(), 1);
        assert_eq!(node.attribute("k"), Some("2"));
    }
}
