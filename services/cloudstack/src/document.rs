//! Navigable XML tree built from CloudStack responses.

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use stacksign_core::{Error, Result};

/// A parsed CloudStack response.
///
/// Two documents are equal when their trees are; the raw body is not compared.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
    body: Bytes,
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for Document {}

/// One XML element: its local name, trimmed text and child elements.
///
/// Attributes are dropped; CloudStack does not use them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Document {
    /// Parse a response body.
    ///
    /// `status` is only used to build the error: a body that is not
    /// well-formed XML yields [`stacksign_core::ErrorKind::ResponseMalformed`]
    /// with `status` as code and the raw body attached.
    pub fn parse(status: u16, body: Bytes) -> Result<Self> {
        match parse_tree(&body) {
            Ok(root) => Ok(Self { root, body }),
            Err(reason) => Err(Error::response_malformed(
                u32::from(status),
                format!("response is not well-formed xml: {reason}"),
                body,
            )),
        }
    }

    /// The root element, e.g. `listzonesresponse`.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The raw body this document was parsed from.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First element named `name`, root included, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.root.find(name)
    }

    /// Every element named `name`, root included, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        self.root.find_all(name)
    }

    /// Text of the first element named `name`.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.root.find_text(name)
    }
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Local tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text directly inside this element, trimmed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Direct children.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First element named `name` in this subtree, depth first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Every element named `name` in this subtree, depth first.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    /// Text of the first element named `name` in this subtree.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(Element::text)
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        if self.name == name {
            found.push(self);
        }
        for c in &self.children {
            c.collect(name, found);
        }
    }
}

fn parse_tree(bs: &[u8]) -> std::result::Result<Element, String> {
    let mut reader = Reader::from_reader(bs);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("{e} at position {}", reader.buffer_position()))?;

        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err("element after the root element".to_string());
                }
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                attach(&mut stack, &mut root, Element::new(name))?;
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| "end tag without start tag".to_string())?;
                attach(&mut stack, &mut root, el)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                push_text(&mut stack, &String::from_utf8_lossy(&c))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of input inside <{}>", open.name));
    }
    root.ok_or_else(|| "no root element".to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    el: Element,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_some() => return Err("more than one root element".to_string()),
        None => *root = Some(el),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(el) => {
            el.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("text outside of the root element".to_string()),
    }
}
