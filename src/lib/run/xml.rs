//! Minimal element tree built on top of the `quick-xml` event reader.
//!
//! The run description is small, so it is read into a tree once and then
//! navigated by element name.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::errors::{InteropError, Result};

/// An XML element with its attributes, children and concatenated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    /// First child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Value of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    /// Value of attribute `name`, or [`InteropError::MissingElement`].
    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| InteropError::MissingElement {
            element: name.to_string(),
            parent: self.name.clone(),
        })
    }

    /// Child `name`, or [`InteropError::MissingElement`].
    pub fn required_child(&self, name: &str) -> Result<&XmlElement> {
        self.child(name).ok_or_else(|| InteropError::MissingElement {
            element: name.to_string(),
            parent: self.name.clone(),
        })
    }

    /// Trimmed text of child `name`, if present.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }
}

fn xml_error(reader: &Reader<&[u8]>, err: impl std::fmt::Display) -> InteropError {
    InteropError::XmlParse { reason: format!("{err} at byte {}", reader.buffer_position()) }
}

fn start_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| xml_error(reader, e))?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement { name, attributes, ..XmlElement::default() })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element '{}'", element.name)),
    }
    Ok(())
}

/// Parses `text` into its single root element.
///
/// # Errors
/// - [`InteropError::EmptyFormat`] when `text` is blank
/// - [`InteropError::XmlParse`] when the document is not well formed
pub(crate) fn parse_document(text: &str) -> Result<XmlElement> {
    if text.trim().is_empty() {
        return Err(InteropError::EmptyFormat);
    }
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(start_element(&reader, &start)?),
            Ok(Event::Empty(start)) => {
                let element = start_element(&reader, &start)?;
                attach(element, &mut stack, &mut root).map_err(|e| xml_error(&reader, e))?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(&reader, "closing tag without an open element"))?;
                attach(element, &mut stack, &mut root).map_err(|e| xml_error(&reader, e))?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| xml_error(&reader, e))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None => return Err(xml_error(&reader, "text outside of the root element")),
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(&reader, e)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(InteropError::XmlParse {
            reason: format!("element '{}' is never closed", open.name),
        });
    }
    root.ok_or_else(|| InteropError::XmlParse { reason: "no root element".to_string() })
}
