//! html2gmi-core: Render HTML documents as Gemini gemtext
//!
//! This crate provides the renderer behind the `html2gmi` CLI:
//! - Text emission with automatic spacing and blockquote prefixes
//! - Footnote-style link citations flushed as `=>` link lines
//! - Optional text-grid tables
//!
//! # Example
//!
//! ```
//! use html2gmi_core::{render_str, RenderOptions};
//!
//! let html = r#"<h1>Hello</h1><p>See <a href="gemini://example.org/">this</a> and
//! <a href="https://example.com/">that</a>.</p>"#;
//! let gmi = render_str(html, &RenderOptions::default()).unwrap();
//! assert!(gmi.starts_with("# Hello"));
//! assert!(gmi.contains("=> gemini://example.org/ [1] this"));
//! ```

pub mod citation;
pub mod emitter;
pub mod error;
pub mod options;
pub mod render;
pub mod table;

pub use citation::{Citation, CitationAccumulator};
pub use error::{RenderError, RenderResult};
pub use options::{CellAlign, PrettyTableOptions, RenderOptions, TableBorders};
pub use render::{RenderContext, render_bytes, render_document, render_reader, render_str};

// Re-export parser types for convenience
pub use html2gmi_dom::{DomError, Element, ElementKind, Node, parse_bytes, parse_str};
