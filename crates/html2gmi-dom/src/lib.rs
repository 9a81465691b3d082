//! html2gmi-dom: HTML node tree for html2gmi
//!
//! This crate provides:
//! - Owned, read-only node tree types
//! - An html5ever-backed parser with byte order mark handling
//!
//! # Example
//!
//! ```
//! use html2gmi_dom::{parse_str, ElementKind, Node};
//!
//! let doc = parse_str("<h1>Hello</h1>");
//! assert!(matches!(doc, Node::Document { .. }));
//! assert_eq!(doc.text_content(), "Hello");
//! assert_eq!(ElementKind::from_tag("h1"), ElementKind::H1);
//! ```

pub mod ast;
pub mod parser;

pub use ast::{Attribute, Element, ElementKind, Node};
pub use parser::{DomError, DomResult, decode, parse_bytes, parse_reader, parse_str};
