//! Minimal element tree built from quick-xml events.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>, position: u64) -> Result<Self> {
        let name = utf8(start.name().as_ref(), position)?.to_string();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| IngestError::parse(e.to_string(), position))?;
            let key = utf8(attr.key.as_ref(), position)?.to_string();
            let raw = utf8(&attr.value, position)?;
            let value = unescape_text(raw, position)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(key, _)| key == name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Elements named `name` in document order, including `self`.
    pub fn elements_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        self.collect_named(name, &mut out);
        out
    }

    fn collect_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        if self.name == name {
            out.push(self);
        }
        for child in self.child_elements() {
            child.collect_named(name, out);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// Parses a complete document and returns its root element.
pub(crate) fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|e| IngestError::parse(e.to_string(), reader.error_position() as u64))?;
        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(IngestError::parse("multiple root elements", position));
                }
                stack.push(Element::from_start(&start, position)?);
            }
            Event::Empty(start) => {
                let element = Element::from_start(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| IngestError::parse("unmatched end tag", position))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                let raw = utf8(&text, position)?;
                let decoded = unescape_text(raw, position)?;
                push_text(&mut stack, &decoded, position)?;
            }
            Event::CData(data) => {
                let raw = utf8(&data, position)?;
                push_text(&mut stack, raw, position)?;
            }
            Event::GeneralRef(reference) => {
                let name = utf8(&reference, position)?;
                let entity = format!("&{name};");
                let decoded = unescape_text(&entity, position)?;
                push_text(&mut stack, &decoded, position)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(IngestError::parse(
            format!("unclosed element <{}>", open.name),
            xml.len() as u64,
        ));
    }
    root.ok_or_else(|| IngestError::parse("document has no root element", 0))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(IngestError::parse("multiple root elements", position));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str, position: u64) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(IngestError::parse("text outside of root element", position)),
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| IngestError::parse(e.to_string(), position))
}

fn unescape_text(raw: &str, position: u64) -> Result<Cow<'_, str>> {
    unescape(raw).map_err(|e| IngestError::parse(e.to_string(), position))
}
