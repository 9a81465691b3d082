//! Render options

/// Options for the gemtext renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Lay tables out as bordered text grids inside a preformatted block
    pub pretty_tables: bool,
    /// Grid styling used when `pretty_tables` is on
    pub table_style: PrettyTableOptions,
    /// Never register link citations
    pub omit_links: bool,
    /// Index given to the first citation
    pub citation_start: usize,
    /// Emit `[n]` markers inline after linked text
    pub citation_markers: bool,
    /// Include `[n]` in flushed citation lines
    pub numbered_links: bool,
    /// Paragraph-like blocks between automatic citation flushes
    pub link_emit_frequency: usize,
    /// Register image sources as citations
    pub emit_images_as_links: bool,
    /// Text placed before an image's description, e.g. `[‡ description]`
    pub image_marker_prefix: String,
    /// Display text for links whose only content is an image
    pub empty_link_prefix: String,
    /// List items and paragraphs with a single link and fewer words than
    /// this collapse into one link line
    pub list_item_link_word_threshold: usize,
    /// Drop `<nav>` and `<footer>` subtrees
    pub skip_navigation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            pretty_tables: false,
            table_style: PrettyTableOptions::default(),
            omit_links: false,
            citation_start: 1,
            citation_markers: true,
            numbered_links: true,
            link_emit_frequency: 2,
            emit_images_as_links: true,
            image_marker_prefix: "‡".to_string(),
            empty_link_prefix: ">>".to_string(),
            list_item_link_word_threshold: 30,
            skip_navigation: true,
        }
    }
}

/// Horizontal alignment of table cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellAlign {
    /// Header and footer centred, body left
    #[default]
    Default,
    Left,
    Center,
    Right,
}

/// Which outer edges of a pretty table are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableBorders {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Default for TableBorders {
    fn default() -> Self {
        TableBorders {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}

/// Styling for pretty tables
#[derive(Debug, Clone, PartialEq)]
pub struct PrettyTableOptions {
    /// Uppercase header and footer text, turning `_` into spaces
    pub auto_format_header: bool,
    /// Wrap body cells wider than `col_width`
    pub auto_wrap_text: bool,
    /// Join a cell's existing line breaks before wrapping it
    pub reflow_during_auto_wrap: bool,
    pub col_width: usize,
    pub column_separator: char,
    pub row_separator: char,
    pub center_separator: char,
    pub header_alignment: CellAlign,
    pub footer_alignment: CellAlign,
    pub alignment: CellAlign,
    /// Per-column body alignment, overriding `alignment`
    pub column_alignment: Vec<CellAlign>,
    /// Draw a line under the header
    pub header_line: bool,
    /// Draw a line between every row
    pub row_line: bool,
    pub borders: TableBorders,
    /// Merge vertically adjacent cells with identical text
    pub auto_merge_cells: bool,
    /// Line ending between grid lines
    pub new_line: String,
}

impl Default for PrettyTableOptions {
    fn default() -> Self {
        PrettyTableOptions {
            auto_format_header: true,
            auto_wrap_text: true,
            reflow_during_auto_wrap: true,
            col_width: 30,
            column_separator: '|',
            row_separator: '-',
            center_separator: '+',
            header_alignment: CellAlign::Default,
            footer_alignment: CellAlign::Default,
            alignment: CellAlign::Default,
            column_alignment: Vec::new(),
            header_line: true,
            row_line: false,
            borders: TableBorders::default(),
            auto_merge_cells: false,
            new_line: "\n".to_string(),
        }
    }
}
