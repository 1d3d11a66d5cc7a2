//! Owned XML document tree built on quick-xml
//!
//! The tree keeps everything the fixup pass doesn't rewrite verbatim:
//! element and attribute names (with their prefixes and `xmlns`
//! declarations), attribute order, comments, processing instructions and
//! text. Only attribute values are held unescaped so they can be inspected
//! and replaced.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io;
use std::str::FromStr;

use quick_xml::errors::IllFormedError;
use quick_xml::escape::{escape, resolve_predefined_entity, unescape_with};
use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::FixupError;

/// SVG namespace URI
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A single attribute of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written in the source, e.g. `width` or `xlink:href`
    pub name: String,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether this is an `xmlns` or `xmlns:*` namespace declaration
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// An element with its attributes in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written in the source
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Written as `<name/>` in the source
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Look up an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Overwrite the value of an existing attribute
    ///
    /// Returns false and leaves the element untouched if there is no
    /// attribute named `name`. Attributes are never added.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => {
                attr.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Child elements, skipping text and other nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Misc(_) => None,
        })
    }
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Text, comment, CDATA, processing instruction, doctype or entity
    /// reference, kept as the raw event and written back unchanged
    Misc(Event<'static>),
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Top-level nodes: prolog, the root element, trailing misc
    nodes: Vec<Node>,
}

impl Document {
    /// Parse a document from XML text
    ///
    /// The XML declaration of the source is dropped; [`Document::to_xml`]
    /// writes its own.
    pub fn parse(source: &str) -> Result<Self, FixupError> {
        let body = source.strip_prefix('\u{feff}').unwrap_or(source);
        let offset = source.len() - body.len();

        let mut reader = Reader::from_str(body);
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut seen_root = false;
        let mut entities = Entities::default();

        loop {
            let start = reader.buffer_position() as usize + offset;
            let event = reader.read_event().map_err(|source| FixupError::Xml {
                position: reader.error_position() as usize + offset,
                source,
            })?;

            match event {
                Event::Start(e) => {
                    if stack.is_empty() && seen_root {
                        return Err(FixupError::MultipleRoots { position: start });
                    }
                    let mut element = element_from_start(&e, start, &entities)?;
                    element.self_closing = false;
                    stack.push(element);
                }
                Event::Empty(e) => {
                    let element = element_from_start(&e, start, &entities)?;
                    if stack.is_empty() {
                        if seen_root {
                            return Err(FixupError::MultipleRoots { position: start });
                        }
                        seen_root = true;
                    }
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::End(e) => {
                    // quick-xml has already matched the end tag against the open one
                    let Some(element) = stack.pop() else {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        return Err(FixupError::Xml {
                            position: start,
                            source: IllFormedError::UnmatchedEndTag(name).into(),
                        });
                    };
                    if stack.is_empty() {
                        seen_root = true;
                    }
                    attach(&mut stack, &mut nodes, Node::Element(element));
                }
                Event::Decl(_) => {}
                Event::DocType(t) => {
                    entities = Entities::from_doctype(&String::from_utf8_lossy(&t));
                    attach(&mut stack, &mut nodes, Node::Misc(Event::DocType(t.into_owned())));
                }
                Event::Eof => break,
                Event::Text(t) if stack.is_empty() => {
                    if !t.iter().all(u8::is_ascii_whitespace) {
                        return Err(FixupError::TextOutsideRoot { position: start });
                    }
                    // Leading whitespace is replaced by the newline after our declaration
                    if !nodes.is_empty() {
                        nodes.push(Node::Misc(Event::Text(t.into_owned())));
                    }
                }
                Event::CData(_) | Event::GeneralRef(_) if stack.is_empty() => {
                    return Err(FixupError::TextOutsideRoot { position: start });
                }
                other => attach(&mut stack, &mut nodes, Node::Misc(other.into_owned())),
            }
        }

        if let Some(open) = stack.pop() {
            return Err(FixupError::UnclosedElement {
                name: open.name,
                position: source.len(),
            });
        }
        if !seen_root {
            return Err(FixupError::NoRootElement);
        }

        Ok(Self { nodes })
    }

    /// Top-level nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The document element
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Misc(_) => None,
        })
    }

    /// All elements in document order (pre-order)
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stack: vec![self.nodes.iter()],
        }
    }

    /// Call `f` on every element in document order (pre-order)
    ///
    /// A parent is visited before its children, so `f` must not rely on
    /// children having been visited already.
    pub fn visit_elements_mut<F: FnMut(&mut Element)>(&mut self, mut f: F) {
        visit_mut(&mut self.nodes, &mut f);
    }

    /// Serialize the document with an XML declaration
    ///
    /// Names are written exactly as parsed, so a default namespace such as
    /// [`SVG_NAMESPACE`] stays unprefixed.
    pub fn to_xml(&self) -> Result<String, FixupError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(FixupError::Serialize)?;
        writer.get_mut().push(b'\n');

        for node in &self.nodes {
            write_node(&mut writer, node).map_err(FixupError::Serialize)?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| FixupError::Serialize(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

impl FromStr for Document {
    type Err = FixupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Pre-order iterator over the elements of a [`Document`]
pub struct Elements<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(Node::Element(e)) => {
                    self.stack.push(e.children.iter());
                    return Some(e);
                }
                Some(Node::Misc(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// General entities declared in the internal DTD subset
#[derive(Debug, Default)]
struct Entities {
    values: HashMap<String, String>,
}

impl Entities {
    /// Collect `<!ENTITY name "value">` declarations from a doctype body
    ///
    /// Parameter entities and external entities are skipped.
    fn from_doctype(doctype: &str) -> Self {
        let mut values = HashMap::new();
        let mut rest = doctype;
        while let Some(at) = rest.find("<!ENTITY") {
            rest = rest[at + "<!ENTITY".len()..].trim_start();
            if rest.starts_with('%') {
                continue;
            }
            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let name = &rest[..name_end];
            rest = rest[name_end..].trim_start();

            let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            let Some(len) = rest[1..].find(quote) else {
                break;
            };
            // First declaration wins
            values
                .entry(name.to_string())
                .or_insert_with(|| rest[1..1 + len].to_string());
            rest = &rest[1 + len + 1..];
        }
        Self { values }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        resolve_predefined_entity(name).or_else(|| self.values.get(name).map(String::as_str))
    }
}

/// Attribute-value normalization: line ends and literal tabs become spaces,
/// then references are replaced
fn attribute_value(raw: &str, entities: &Entities) -> Result<String, quick_xml::Error> {
    let normalized = raw.replace("\r\n", " ").replace(['\t', '\n', '\r'], " ");
    let value = unescape_with(&normalized, |name| entities.resolve(name))?;
    Ok(value.into_owned())
}

fn element_from_start(
    start: &BytesStart<'_>,
    position: usize,
    entities: &Entities,
) -> Result<Element, FixupError> {
    let xml_error = |source: quick_xml::Error| FixupError::Xml { position, source };

    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(e.into()))?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attribute_value(&String::from_utf8_lossy(&attr.value), entities)
            .map_err(xml_error)?;
        element.attributes.push(Attribute { name, value });
    }
    Ok(element)
}

fn attach(stack: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

fn visit_mut<F: FnMut(&mut Element)>(nodes: &mut [Node], f: &mut F) {
    for node in nodes {
        if let Node::Element(element) = node {
            f(element);
            visit_mut(&mut element.children, f);
        }
    }
}

/// Escape an attribute value so it reads back identically. Tab, newline and
/// carriage return only reach here from character references, a literal one
/// would be folded to a space by the reader.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> io::Result<()> {
    match node {
        Node::Misc(event) => writer.write_event(event.borrow()),
        Node::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for attr in &element.attributes {
                start.push_attribute(XmlAttribute {
                    key: QName(attr.name.as_bytes()),
                    value: Cow::Owned(escape_attribute(&attr.value).into_bytes()),
                });
            }

            if element.self_closing && element.children.is_empty() {
                return writer.write_event(Event::Empty(start));
            }

            writer.write_event(Event::Start(start))?;
            for child in &element.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
        }
    }
}
