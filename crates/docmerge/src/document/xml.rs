//! A small mutable XML tree over quick-xml events.
//!
//! The tree keeps element names and attributes exactly as written (prefixes
//! included) and carries comments, processing instructions, and CDATA through
//! untouched, so a part can be loaded, edited in a few places, and saved
//! without disturbing the rest of its markup. Elements are addressed by
//! [`NodePath`]s of child indices from the root.

use std::str;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::document::XmlError;

/// Child indices leading from the root element to a descendant.
pub type NodePath = Vec<usize>;

/// A node in an element's content.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    /// Comment, processing instruction, or CDATA, written back verbatim.
    Other(Event<'static>),
}

/// An XML element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element with a qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8(start.name().as_ref().to_vec())?;
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = String::from_utf8(attribute.key.as_ref().to_vec())?;
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Qualified name, e.g. `w:r`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Append a child node.
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Child elements with their indices among all children.
    pub fn elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node {
                Node::Element(element) => Some((index, element)),
                Node::Text(_) | Node::Other(_) => None,
            })
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements()
            .map(|(_, element)| element)
            .find(|element| element.name == name)
    }

    /// Mutable first child element with the given name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            Node::Element(_) | Node::Text(_) | Node::Other(_) => None,
        })
    }

    /// Concatenated text of all descendants, CDATA sections included.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for child in &self.children {
            match child {
                Node::Element(element) => element.collect_text(text),
                Node::Text(value) => text.push_str(value),
                Node::Other(Event::CData(data)) => {
                    if let Ok(value) = str::from_utf8(data) {
                        text.push_str(value);
                    }
                }
                Node::Other(_) => {}
            }
        }
    }

    /// Replace all content with a single text node.
    pub fn set_text(&mut self, value: &str) {
        self.children.clear();
        if !value.is_empty() {
            self.children.push(Node::Text(value.to_string()));
        }
    }

    /// Descendant element at `path`; the empty path is this element.
    pub fn get(&self, path: &[usize]) -> Option<&Element> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        match self.children.get(*first)? {
            Node::Element(element) => element.get(rest),
            Node::Text(_) | Node::Other(_) => None,
        }
    }

    /// Mutable descendant element at `path`.
    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        match self.children.get_mut(*first)? {
            Node::Element(element) => element.get_mut(rest),
            Node::Text(_) | Node::Other(_) => None,
        }
    }

    /// Visit this element and every descendant element in document order.
    pub fn walk(&self, visit: &mut impl FnMut(&[usize], &Element)) {
        let mut path = Vec::new();
        self.walk_at(&mut path, visit);
    }

    fn walk_at(&self, path: &mut NodePath, visit: &mut impl FnMut(&[usize], &Element)) {
        visit(path, self);
        for (index, element) in self.elements() {
            path.push(index);
            element.walk_at(path, visit);
            path.pop();
        }
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(value) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(
                        value.as_str(),
                    ))))?;
                }
                Node::Other(event) => writer.write_event(event.clone())?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// A parsed XML part.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    prolog: Vec<Event<'static>>,
    root: Element,
    epilog: Vec<Event<'static>>,
}

impl XmlDocument {
    /// Parse a complete XML document.
    pub fn parse(source: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(source);
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let node = match reader.read_event()? {
                Event::Eof => break,
                Event::Start(start) => {
                    open.push(Element::from_start(&start)?);
                    continue;
                }
                Event::End(_) => match open.pop() {
                    Some(element) => Node::Element(element),
                    None => {
                        return Err(XmlError::Malformed {
                            message: "closing tag without matching opening tag".to_string(),
                        });
                    }
                },
                Event::Empty(start) => Node::Element(Element::from_start(&start)?),
                Event::Text(text) if !open.is_empty() => Node::Text(text.unescape()?.into_owned()),
                other => Node::Other(other.into_owned()),
            };

            if let Some(parent) = open.last_mut() {
                parent.push(node);
                continue;
            }
            match node {
                Node::Element(element) if root.is_none() => root = Some(element),
                Node::Element(element) => {
                    return Err(XmlError::Malformed {
                        message: format!("second root element <{}>", element.name),
                    });
                }
                Node::Other(event) if root.is_none() => prolog.push(event),
                Node::Other(event) => epilog.push(event),
                Node::Text(_) => {}
            }
        }

        if let Some(element) = open.last() {
            return Err(XmlError::Malformed {
                message: format!("unclosed element <{}>", element.name),
            });
        }
        let root = root.ok_or_else(|| XmlError::Malformed {
            message: "document has no root element".to_string(),
        })?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize back to XML text.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.prolog {
            writer.write_event(event.clone())?;
        }
        self.root.write(&mut writer)?;
        for event in &self.epilog {
            writer.write_event(event.clone())?;
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// The prefix the root element binds to `namespace`.
    ///
    /// Returns `Some("")` when `namespace` is the default namespace.
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.root
            .attributes
            .iter()
            .filter(|(_, value)| value == namespace)
            .find_map(|(key, _)| {
                if key == "xmlns" {
                    Some("")
                } else {
                    key.strip_prefix("xmlns:")
                }
            })
    }
}

/// Join a namespace prefix and a local name.
pub(crate) fn qualified_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}
