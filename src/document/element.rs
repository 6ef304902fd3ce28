//! A small owned element tree over quick-xml events.
//!
//! The document schema is namespaced, but every tag lives in the single
//! default namespace, so elements are stored and matched by local name
//! (prefixes stripped on parse). Serialization declares the namespace on the
//! root element and emits unprefixed tags.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::DocumentError;

/// An element: a tag name, ordered attributes, and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    /// Creates an empty element with the given tag name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parses a complete document (or fragment with a single root element).
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Xml`] when the bytes are not well-formed
    /// markup, or [`DocumentError::Malformed`] when no root element exists.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Self> = Vec::new();
        let mut root = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or(DocumentError::Malformed("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape()?;
                        if !text.is_empty() {
                            parent.children.push(Node::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and
                // doctypes carry no topic data.
                _ => {}
            }
            buf.clear();
        }

        root.ok_or(DocumentError::Malformed("no root element"))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, DocumentError> {
        let name = local_name(start.name().as_ref());
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// The element's local tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element's attributes, in document order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing value or appending.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| *key == name) {
            entry.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    /// Appends a child element.
    pub fn push_element(&mut self, child: Self) {
        self.children.push(Node::Element(child));
    }

    /// Appends a text child.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// The first direct child element with the given local name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Self> {
        self.elements().find(|element| element.name == name)
    }

    /// All direct child elements with the given local name, in order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.elements().filter(move |element| element.name == name)
    }

    /// Depth-first search for the first element with the given local name,
    /// including `self`.
    #[must_use]
    pub fn find_descendant(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.elements()
            .find_map(|element| element.find_descendant(name))
    }

    /// Mutable variant of [`Element::find_descendant`].
    pub fn find_descendant_mut(&mut self, name: &str) -> Option<&mut Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) => element.find_descendant_mut(name),
            Node::Text(_) => None,
        })
    }

    /// Removes and returns the first direct child element with the given
    /// local name.
    pub fn remove_child(&mut self, name: &str) -> Option<Self> {
        let index = self.children.iter().position(|node| {
            matches!(node, Node::Element(element) if element.name == name)
        })?;
        match self.children.remove(index) {
            Node::Element(element) => Some(element),
            Node::Text(_) => unreachable!("position matched an element node"),
        }
    }

    /// Direct child elements, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated direct text content.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Serializes this element as a complete document: declaration first,
    /// then the tree, with `namespace` declared on the root so emitted tags
    /// are unprefixed. An explicit `xmlns` already present on the root wins.
    #[must_use]
    pub fn to_document_bytes(&self, namespace: &str) -> Vec<u8> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
            .expect("writing to a Vec must never fail");
        self.write_into(&mut writer, Some(namespace));
        writer.into_inner()
    }

    /// Serializes this element alone, without declaration or namespace.
    ///
    /// Used for the opaque style blob.
    #[must_use]
    pub fn to_fragment_string(&self) -> String {
        let mut writer = Writer::new(Vec::new());
        self.write_into(&mut writer, None);
        String::from_utf8_lossy(&writer.into_inner()).into_owned()
    }

    fn write_into(&self, writer: &mut Writer<Vec<u8>>, namespace: Option<&str>) {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if let Some(namespace) = namespace {
            if self.attr("xmlns").is_none() {
                start.push_attribute(("xmlns", namespace));
            }
        }

        if self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .expect("writing to a Vec must never fail");
            return;
        }

        writer
            .write_event(Event::Start(start))
            .expect("writing to a Vec must never fail");
        for node in &self.children {
            match node {
                Node::Element(element) => element.write_into(writer, None),
                Node::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .expect("writing to a Vec must never fail"),
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .expect("writing to a Vec must never fail");
    }
}

/// Strips any namespace prefix from a qualified tag name.
fn local_name(qname: &[u8]) -> String {
    let local = qname
        .iter()
        .rposition(|&byte| byte == b':')
        .map_or(qname, |colon| &qname[colon + 1..]);
    String::from_utf8_lossy(local).into_owned()
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
    } else if root.is_none() {
        *root = Some(element);
    }
    // Content after the root element is not meaningful; drop it.
}
