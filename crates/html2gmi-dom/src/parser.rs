//! HTML parsing
//!
//! Builds a [`Node`] tree with html5ever. Comments, doctypes and processing
//! instructions are dropped; everything else is kept in source order.

use std::borrow::Cow;
use std::io::Read;

use encoding_rs::{Encoding, UTF_8};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use thiserror::Error;

use crate::ast::{Attribute, Element, Node};

/// Errors produced while reading or decoding input
#[derive(Debug, Error)]
pub enum DomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input is not valid {encoding}")]
    Decode { encoding: &'static str },
}

/// Result alias for this crate
pub type DomResult<T> = Result<T, DomError>;

/// Parse an HTML document from text
///
/// A leading U+FEFF byte order mark is ignored.
pub fn parse_str(html: &str) -> Node {
    let html = html.strip_prefix('\u{feff}').unwrap_or(html);
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    convert(&dom.document).unwrap_or_else(|| Node::document(Vec::new()))
}

/// Parse an HTML document from raw bytes
///
/// The encoding is sniffed from a byte order mark (UTF-8, UTF-16LE or
/// UTF-16BE); without one the input must be UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> DomResult<Node> {
    let text = decode(bytes)?;
    Ok(parse_str(&text))
}

/// Read everything from `reader` and parse it
pub fn parse_reader<R: Read>(mut reader: R) -> DomResult<Node> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

/// Decode bytes to text, removing a byte order mark if present
pub fn decode(bytes: &[u8]) -> DomResult<Cow<'_, str>> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .ok_or(DomError::Decode {
            encoding: encoding.name(),
        })
}

fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Document => Some(Node::Document {
            children: convert_children(handle),
        }),
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    key: attr.name.local.as_ref().to_string(),
                    value: attr.value.to_string(),
                })
                .collect();
            Some(Node::Element(Element::new(
                name.local.as_ref(),
                attrs,
                convert_children(handle),
            )))
        }
        NodeData::Text { contents } => Some(Node::Text {
            value: contents.borrow().to_string(),
        }),
        NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => None,
    }
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle.children.borrow().iter().filter_map(convert).collect()
}
