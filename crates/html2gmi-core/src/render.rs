//! Tree walker and entry points
//!
//! Walks an HTML node tree depth-first and writes gemtext through a
//! [`TextEmitter`], collecting link citations and table cells on the way.

use std::io::Read;

use html2gmi_dom::{Element, ElementKind, Node, parse_bytes, parse_reader, parse_str};

use crate::citation::{Citation, CitationAccumulator};
use crate::emitter::{TextEmitter, collapse_whitespace, normalize_output};
use crate::error::RenderResult;
use crate::options::RenderOptions;
use crate::table::TableContext;

/// Marker written in place of a table when pretty tables are off
const PLAIN_TABLE_MARKER: &str = "\n\n⊞ table ⊞\n\n";

/// Render a parsed document with the given options
pub fn render_document(node: &Node, options: &RenderOptions) -> RenderResult<String> {
    let mut ctx = RenderContext::new(options);
    ctx.render(node)?;
    tracing::debug!(citations = ctx.citations().len(), "walked document");
    let output = ctx.finish()?;
    tracing::debug!(bytes = output.len(), "rendered gemtext");
    Ok(output)
}

/// Parse and render HTML text
pub fn render_str(html: &str, options: &RenderOptions) -> RenderResult<String> {
    tracing::debug!(bytes = html.len(), "parsing HTML text");
    render_document(&parse_str(html), options)
}

/// Parse and render raw HTML bytes, honoring a byte order mark
pub fn render_bytes(bytes: &[u8], options: &RenderOptions) -> RenderResult<String> {
    tracing::debug!(bytes = bytes.len(), "parsing HTML bytes");
    let doc = parse_bytes(bytes)?;
    render_document(&doc, options)
}

/// Read, parse and render HTML from any reader
pub fn render_reader<R: Read>(reader: R, options: &RenderOptions) -> RenderResult<String> {
    let doc = parse_reader(reader)?;
    render_document(&doc, options)
}

/// Mutable state for one render
///
/// Peek-ahead probes and table cells each get their own short-lived context
/// that shares only the options (and, for cells, the citation accumulator).
#[derive(Debug)]
pub struct RenderContext<'a> {
    options: &'a RenderOptions,
    emitter: TextEmitter,
    blockquote_level: usize,
    is_pre: bool,
    just_closed_div: bool,
    show_markers: bool,
    /// Set on peek-ahead contexts, which never flush citations
    probe: bool,
    table: TableContext,
    table_depth: usize,
    citations: CitationAccumulator,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        RenderContext {
            options,
            emitter: TextEmitter::new(),
            blockquote_level: 0,
            is_pre: false,
            just_closed_div: false,
            show_markers: options.citation_markers,
            probe: false,
            table: TableContext::new(),
            table_depth: 0,
            citations: CitationAccumulator::new(),
        }
    }

    /// Walk a node, appending to this context's output
    pub fn render(&mut self, node: &Node) -> RenderResult<()> {
        self.walk(node)
    }

    /// Citations registered so far
    pub fn citations(&self) -> &[Citation] {
        self.citations.citations()
    }

    /// Flush remaining citations and return the normalized output
    pub fn finish(mut self) -> RenderResult<String> {
        self.flush_citations()?;
        Ok(normalize_output(self.emitter.as_str()))
    }

    fn sub_context(&self, show_markers: bool, probe: bool) -> RenderContext<'a> {
        RenderContext {
            show_markers,
            probe,
            table_depth: self.table_depth,
            ..RenderContext::new(self.options)
        }
    }

    fn emit(&mut self, fragment: &str) -> RenderResult<()> {
        self.emitter.emit(fragment)?;
        Ok(())
    }

    fn walk(&mut self, node: &Node) -> RenderResult<()> {
        match node {
            Node::Document { children } => self.walk_children(children),
            Node::Element(element) => self.element(element),
            Node::Text { value } => {
                if self.is_pre {
                    self.emitter.emit_verbatim(value)?;
                    Ok(())
                } else {
                    self.emit(&collapse_whitespace(value))
                }
            }
        }
    }

    fn walk_children(&mut self, children: &[Node]) -> RenderResult<()> {
        for child in children {
            self.walk(child)?;
        }
        Ok(())
    }

    fn element(&mut self, element: &Element) -> RenderResult<()> {
        self.just_closed_div = false;

        match element.kind {
            ElementKind::LineBreak => self.emit("\n"),
            ElementKind::H1 | ElementKind::H2 | ElementKind::H3 => self.heading(element),
            ElementKind::Blockquote => self.blockquote(element),
            ElementKind::Division => self.division(element),
            ElementKind::ListItem => self.list_item(element),
            ElementKind::Image => self.image(element),
            ElementKind::Anchor => self.anchor(element),
            ElementKind::UnorderedList => self.paragraph_block(&element.children),
            ElementKind::Paragraph => self.paragraph(element),
            kind if kind.is_table_part() => {
                if self.options.pretty_tables {
                    self.pretty_table_part(element)
                } else {
                    self.plain_table_part(element)
                }
            }
            ElementKind::Preformatted => self.preformatted(element),
            ElementKind::Style | ElementKind::Script | ElementKind::Head => Ok(()),
            ElementKind::Nav | ElementKind::Footer if self.options.skip_navigation => Ok(()),
            _ => self.walk_children(&element.children),
        }
    }

    fn heading(&mut self, element: &Element) -> RenderResult<()> {
        let level = element.kind.heading_level().unwrap_or(1);
        self.flush_citations()?;
        self.emit(&format!("\n\n{} ", "#".repeat(level)))?;
        self.walk_children(&element.children)?;
        self.emit("\n\n")
    }

    fn blockquote(&mut self, element: &Element) -> RenderResult<()> {
        self.flush_citations()?;
        if self.emitter.line_length() > 0 {
            self.emit("\n")?;
        }

        self.blockquote_level += 1;
        self.emitter.set_prefix(quote_prefix(self.blockquote_level));
        self.emit("\n")?;
        self.walk_children(&element.children)?;

        self.blockquote_level -= 1;
        self.emitter.set_prefix(quote_prefix(self.blockquote_level));
        self.emit("\n\n")
    }

    fn division(&mut self, element: &Element) -> RenderResult<()> {
        if self.emitter.line_length() > 0 {
            self.emit("\n")?;
        }
        self.walk_children(&element.children)?;
        // A nested division that just closed already ended the line
        if !self.just_closed_div {
            self.emit("\n")?;
        }
        self.just_closed_div = true;
        Ok(())
    }

    fn list_item(&mut self, element: &Element) -> RenderResult<()> {
        let peek = self.peek(&element.children)?;
        if self.emitter.line_length() > 0 {
            self.emit("\n")?;
        }

        if let Some(line) = peek.short_link_line(self.options.list_item_link_word_threshold) {
            return self.emit(&format!("{line}\n"));
        }
        if peek.citations.is_empty() {
            if peek.text.is_empty() {
                return Ok(());
            }
            // A nested block already collapsed into a link line
            if peek.text.starts_with("=> ") {
                return self.emit(&format!("{}\n", peek.text));
            }
            return self.emit(&format!("* {}\n", peek.text));
        }

        self.emit("* ")?;
        self.walk_children(&element.children)?;
        self.emit("\n")
    }

    fn paragraph(&mut self, element: &Element) -> RenderResult<()> {
        let peek = self.peek(&element.children)?;

        if let Some(line) = peek.short_link_line(self.options.list_item_link_word_threshold) {
            self.check_flush()?;
            return self.emit(&format!("\n\n{line}\n\n"));
        }
        if peek.citations.is_empty() {
            if peek.text.is_empty() {
                return Ok(());
            }
            self.check_flush()?;
            self.emit("\n\n")?;
            self.emit(&peek.text)?;
            return self.emit("\n\n");
        }

        self.paragraph_block(&element.children)
    }

    fn paragraph_block(&mut self, children: &[Node]) -> RenderResult<()> {
        self.check_flush()?;
        self.emit("\n\n")?;
        self.walk_children(children)?;
        self.emit("\n\n")
    }

    fn image(&mut self, element: &Element) -> RenderResult<()> {
        let src = element.attr("src").unwrap_or_default();
        let alt = match element.attr("alt").map(str::trim) {
            Some(alt) if !alt.is_empty() => alt.to_string(),
            _ => file_stem(src),
        };
        if alt.is_empty() {
            return Ok(());
        }

        let display = image_display(&self.options.image_marker_prefix, &alt);
        self.emit(&display)?;

        if self.options.emit_images_as_links {
            let src = normalize_href(src);
            if !self.options.omit_links && !src.is_empty() && src != display {
                let marker = self.register(&src, &display);
                self.emit(&marker)?;
            }
        }
        Ok(())
    }

    fn anchor(&mut self, element: &Element) -> RenderResult<()> {
        let mut link_text = match element.sole_child() {
            Some(Node::Text { value }) => collapse_whitespace(value).into_owned(),
            _ => String::new(),
        };

        self.walk_children(&element.children)?;

        let href = element.attr("href").map(normalize_href).unwrap_or_default();
        let linked = !self.options.omit_links && !href.is_empty() && !href.starts_with('#');
        if !linked {
            return Ok(());
        }

        if matches!(element.sole_child(), Some(Node::Element(child)) if child.kind == ElementKind::Image)
        {
            link_text = self.options.empty_link_prefix.clone();
            self.emit(&format!(" {link_text}"))?;
        }
        if href != link_text {
            let marker = self.register(&href, &link_text);
            self.emit(&marker)?;
        }
        Ok(())
    }

    fn preformatted(&mut self, element: &Element) -> RenderResult<()> {
        self.emit("\n\n```\n")?;
        let was_pre = std::mem::replace(&mut self.is_pre, true);
        self.walk_children(&element.children)?;
        self.is_pre = was_pre;
        self.emit("\n```\n\n")
    }

    fn plain_table_part(&mut self, element: &Element) -> RenderResult<()> {
        match element.kind {
            ElementKind::Table => {
                self.emit(PLAIN_TABLE_MARKER)?;
                self.paragraph_block(&element.children)
            }
            ElementKind::TableRow => {
                self.emit("\n")?;
                self.walk_children(&element.children)
            }
            _ => self.walk_children(&element.children),
        }
    }

    fn pretty_table_part(&mut self, element: &Element) -> RenderResult<()> {
        match element.kind {
            ElementKind::Table => self.pretty_table(element),
            ElementKind::TableFooter => {
                let was_footer = std::mem::replace(&mut self.table.in_footer, true);
                self.walk_children(&element.children)?;
                self.table.in_footer = was_footer;
                Ok(())
            }
            ElementKind::TableRow => {
                self.table.open_row();
                self.walk_children(&element.children)?;
                self.table.close_row();
                Ok(())
            }
            ElementKind::TableHeaderCell => {
                let cell = self.render_cell(element)?;
                self.table.push_header(cell);
                Ok(())
            }
            _ => {
                let cell = self.render_cell(element)?;
                self.table.push_cell(cell);
                Ok(())
            }
        }
    }

    fn pretty_table(&mut self, element: &Element) -> RenderResult<()> {
        let outermost = self.table_depth == 0;
        self.emit(if outermost { "\n\n```\n" } else { "\n\n" })?;
        self.table_depth += 1;

        let enclosing = std::mem::take(&mut self.table);
        self.walk_children(&element.children)?;
        let collected = std::mem::replace(&mut self.table, enclosing);

        let grid = collected.render(&self.options.table_style);
        if !grid.is_empty() {
            self.emit(&grid)?;
            self.emit("\n")?;
        }

        self.table_depth -= 1;
        self.emit(if outermost { "```\n\n" } else { "\n\n" })
    }

    /// Render each child of a cell as its own finished document
    ///
    /// Citations found inside the cell stay in this context's accumulator and
    /// are flushed once the walk has left every table.
    fn render_cell(&mut self, element: &Element) -> RenderResult<String> {
        let mut parts = Vec::new();
        for child in &element.children {
            let mut cell = self.sub_context(self.show_markers, self.probe);
            cell.citations = std::mem::take(&mut self.citations);
            let walked = cell.walk(child);
            self.citations = std::mem::take(&mut cell.citations);
            walked?;

            let text = normalize_output(cell.emitter.as_str());
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(parts.join("\n"))
    }

    /// Render children into a scratch context to decide how to lay them out
    fn peek(&self, children: &[Node]) -> RenderResult<Peek> {
        let mut scratch = self.sub_context(false, true);
        scratch.walk_children(children)?;
        Ok(Peek {
            text: normalize_output(scratch.emitter.as_str()),
            citations: scratch.citations.into_citations(),
        })
    }

    fn register(&mut self, url: &str, display: &str) -> String {
        match self
            .citations
            .register(url, display, self.options.citation_start)
        {
            Some(index) if self.show_markers => format!("[{index}]"),
            _ => String::new(),
        }
    }

    fn check_flush(&mut self) -> RenderResult<()> {
        if self.citations.note_block(self.options.link_emit_frequency) {
            self.flush_citations()?;
        }
        Ok(())
    }

    fn flush_citations(&mut self) -> RenderResult<()> {
        if self.table_depth > 0 || self.probe {
            return Ok(());
        }
        if let Some(block) = self.citations.take_block(self.options.numbered_links) {
            tracing::trace!(
                through = ?self.citations.flushed_through(),
                "flushing citations"
            );
            self.emitter.write_raw("\n\n")?;
            self.emitter.write_raw(&block)?;
            self.emitter.write_raw("\n")?;
        }
        Ok(())
    }
}

/// Outcome of a peek-ahead probe
struct Peek {
    text: String,
    citations: Vec<Citation>,
}

impl Peek {
    /// A single link line when the content is one short link
    fn short_link_line(&self, threshold: usize) -> Option<String> {
        let [citation] = self.citations.as_slice() else {
            return None;
        };
        let words: Vec<&str> = self.text.split_whitespace().collect();
        if words.len() >= threshold {
            return None;
        }
        if words.is_empty() {
            Some(format!("=> {}", citation.url))
        } else {
            Some(format!("=> {} {}", citation.url, words.join(" ")))
        }
    }
}

fn quote_prefix(level: usize) -> String {
    if level == 0 {
        String::new()
    } else {
        format!("{} ", ">".repeat(level))
    }
}

/// Trim a link target and drop a `mailto:` scheme
fn normalize_href(href: &str) -> String {
    let href = href.trim();
    href.strip_prefix("mailto:").unwrap_or(href).to_string()
}

/// File name of the last path segment without its extension
fn file_stem(src: &str) -> String {
    let name = src.trim().rsplit('/').next().unwrap_or_default();
    match name.rfind('.') {
        Some(pos) if pos > 0 => name[..pos].to_string(),
        _ => name.to_string(),
    }
}

/// `[<prefix> description]` with `_` and `-` read as spaces
fn image_display(prefix: &str, alt: &str) -> String {
    let inner = if prefix.is_empty() {
        alt.to_string()
    } else {
        format!("{prefix} {alt}")
    };
    let inner = inner.replace(['_', '-'], " ");
    let words: Vec<&str> = inner.split(' ').filter(|w| !w.is_empty()).collect();
    format!("[{}]", words.join(" "))
}
