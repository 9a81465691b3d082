//! Link citations
//!
//! Links found while rendering are numbered in registration order and written
//! out later as a block of gemtext link lines (`=> url [n] text`).

/// A registered link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub index: usize,
    pub url: String,
    pub display: String,
}

impl Citation {
    /// Format as a gemtext link line, without the trailing newline
    pub fn link_line(&self, numbered: bool) -> String {
        let mut line = format!("=> {}", self.url);
        if numbered {
            line.push_str(&format!(" [{}]", self.index));
        }
        if !self.display.is_empty() {
            line.push(' ');
            line.push_str(&self.display);
        }
        line
    }
}

/// Ordered citations plus the flush cursors
#[derive(Debug, Clone, Default)]
pub struct CitationAccumulator {
    citations: Vec<Citation>,
    /// Number of citations already written out
    flushed: usize,
    paragraphs_since_flush: usize,
}

impl CitationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link and return its index
    ///
    /// In-page fragments (`#...`) are not registered. Literal spaces in the
    /// URL are percent-encoded.
    pub fn register(&mut self, url: &str, display: &str, start: usize) -> Option<usize> {
        if url.starts_with('#') {
            return None;
        }
        let index = self.citations.len() + start;
        self.citations.push(Citation {
            index,
            url: url.replace(' ', "%20"),
            display: display.to_string(),
        });
        Some(index)
    }

    /// All citations registered so far
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Citations registered since the last flush
    pub fn pending(&self) -> &[Citation] {
        &self.citations[self.flushed..]
    }

    pub fn has_pending(&self) -> bool {
        self.flushed < self.citations.len()
    }

    /// Position of the last flushed citation, if any
    pub fn flushed_through(&self) -> Option<usize> {
        self.flushed.checked_sub(1)
    }

    pub fn paragraphs_since_flush(&self) -> usize {
        self.paragraphs_since_flush
    }

    /// Count a paragraph-like block boundary
    ///
    /// Returns true when more than `frequency` blocks have passed since the
    /// last flush and there is something to flush.
    pub fn note_block(&mut self, frequency: usize) -> bool {
        self.paragraphs_since_flush += 1;
        self.paragraphs_since_flush > frequency && self.has_pending()
    }

    /// Take the pending citations as link lines and advance the cursors
    ///
    /// Returns `None` when nothing is pending.
    pub fn take_block(&mut self, numbered: bool) -> Option<String> {
        if !self.has_pending() {
            return None;
        }
        let mut block = String::new();
        for citation in self.pending() {
            block.push_str(&citation.link_line(numbered));
            block.push('\n');
        }
        self.flushed = self.citations.len();
        self.paragraphs_since_flush = 0;
        Some(block)
    }

    pub fn into_citations(self) -> Vec<Citation> {
        self.citations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_consecutive() {
        let mut acc = CitationAccumulator::new();
        assert_eq!(acc.register("http://a/", "a", 1), Some(1));
        assert_eq!(acc.register("http://b/", "b", 1), Some(2));
        assert_eq!(acc.register("#frag", "frag", 1), None);
        assert_eq!(acc.register("http://c/", "c", 1), Some(3));
        let indices: Vec<_> = acc.citations().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_citation_start() {
        let mut acc = CitationAccumulator::new();
        assert_eq!(acc.register("http://a/", "a", 5), Some(5));
        assert_eq!(acc.register("http://b/", "b", 5), Some(6));
    }

    #[test]
    fn test_spaces_are_encoded() {
        let mut acc = CitationAccumulator::new();
        acc.register("foo spaced/page one", "x", 1);
        assert_eq!(acc.citations()[0].url, "foo%20spaced/page%20one");
    }

    #[test]
    fn test_link_line_formats() {
        let citation = Citation {
            index: 3,
            url: "gemini://example.org/".to_string(),
            display: "Example".to_string(),
        };
        assert_eq!(citation.link_line(true), "=> gemini://example.org/ [3] Example");
        assert_eq!(citation.link_line(false), "=> gemini://example.org/ Example");

        let bare = Citation {
            display: String::new(),
            ..citation
        };
        assert_eq!(bare.link_line(true), "=> gemini://example.org/ [3]");
        assert_eq!(bare.link_line(false), "=> gemini://example.org/");
    }

    #[test]
    fn test_take_block_advances_cursor() {
        let mut acc = CitationAccumulator::new();
        assert!(acc.take_block(true).is_none());
        assert_eq!(acc.flushed_through(), None);

        acc.register("http://a/", "a", 1);
        acc.register("http://b/", "b", 1);
        let block = acc.take_block(true).unwrap();
        assert_eq!(block, "=> http://a/ [1] a\n=> http://b/ [2] b\n");
        assert_eq!(acc.flushed_through(), Some(1));
        assert!(!acc.has_pending());
        assert!(acc.take_block(true).is_none());

        acc.register("http://c/", "c", 1);
        assert_eq!(acc.take_block(false).unwrap(), "=> http://c/ c\n");
        assert_eq!(acc.flushed_through(), Some(2));
    }

    #[test]
    fn test_note_block_threshold() {
        let mut acc = CitationAccumulator::new();
        acc.register("http://a/", "a", 1);
        assert!(!acc.note_block(2));
        assert!(!acc.note_block(2));
        assert!(acc.note_block(2));
        acc.take_block(true);
        assert_eq!(acc.paragraphs_since_flush(), 0);

        // Nothing pending: the counter grows but never asks for a flush
        for _ in 0..5 {
            assert!(!acc.note_block(2));
        }
        assert_eq!(acc.paragraphs_since_flush(), 5);
    }
}
