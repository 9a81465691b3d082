//! HTML node tree types
//!
//! A read-only, owned view of a parsed HTML document. The renderer only ever
//! walks this tree; it never mutates it.

use serde::{Deserialize, Serialize};

/// A node in the document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Document root
    Document { children: Vec<Node> },
    /// Element with tag, attributes and children
    Element(Element),
    /// Character data
    Text { value: String },
}

/// An element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Classified element kind
    pub kind: ElementKind,
    /// Lowercase tag name as it appeared in the source
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// A key/value attribute pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Element kinds the renderer distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    H1,
    H2,
    H3,
    Paragraph,
    Division,
    ListItem,
    UnorderedList,
    Anchor,
    Image,
    Blockquote,
    Table,
    TableRow,
    TableHeaderCell,
    TableDataCell,
    TableFooter,
    Preformatted,
    LineBreak,
    Style,
    Script,
    Head,
    Nav,
    Footer,
    /// Anything else; rendered as its children
    Other,
}

impl ElementKind {
    /// Classify a tag name (case-insensitive)
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "h1" => Self::H1,
            "h2" => Self::H2,
            "h3" => Self::H3,
            "p" => Self::Paragraph,
            "div" => Self::Division,
            "li" => Self::ListItem,
            "ul" => Self::UnorderedList,
            "a" => Self::Anchor,
            "img" => Self::Image,
            "blockquote" => Self::Blockquote,
            "table" => Self::Table,
            "tr" => Self::TableRow,
            "th" => Self::TableHeaderCell,
            "td" => Self::TableDataCell,
            "tfoot" => Self::TableFooter,
            "pre" => Self::Preformatted,
            "br" => Self::LineBreak,
            "style" => Self::Style,
            "script" => Self::Script,
            "head" => Self::Head,
            "nav" => Self::Nav,
            "footer" => Self::Footer,
            _ => Self::Other,
        }
    }

    /// Heading depth for h1-h3, `None` for everything else
    pub fn heading_level(self) -> Option<usize> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            _ => None,
        }
    }

    /// True for the kinds the table renderer handles
    pub fn is_table_part(self) -> bool {
        matches!(
            self,
            Self::Table
                | Self::TableRow
                | Self::TableHeaderCell
                | Self::TableDataCell
                | Self::TableFooter
        )
    }
}

impl Node {
    /// Create a document root
    pub fn document(children: Vec<Node>) -> Self {
        Node::Document { children }
    }

    /// Create a text node
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    /// Create an element node without attributes
    pub fn element(tag: &str, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag, Vec::new(), children))
    }

    /// Create an element node with attributes
    pub fn element_with_attrs(tag: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Self {
        let attrs = attrs
            .iter()
            .map(|(key, value)| Attribute {
                key: (*key).to_string(),
                value: (*value).to_string(),
            })
            .collect();
        Node::Element(Element::new(tag, attrs, children))
    }

    /// Children of a document or element; text nodes have none
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children } => children,
            Node::Element(element) => &element.children,
            Node::Text { .. } => &[],
        }
    }

    /// Borrow as an element, if this is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated character data of this node and all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Pretty-printed JSON representation of the tree
    #[cfg(feature = "json")]
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Rebuild a tree from its JSON representation
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn collect_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { value } => out.push_str(value),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

impl Element {
    pub fn new(tag: &str, attrs: Vec<Attribute>, children: Vec<Node>) -> Self {
        let tag = tag.to_ascii_lowercase();
        Element {
            kind: ElementKind::from_tag(&tag),
            tag,
            attrs,
            children,
        }
    }

    /// Look up an attribute value by key (case-insensitive)
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.key.eq_ignore_ascii_case(key))
            .map(|a| a.value.as_str())
    }

    /// The only child, if there is exactly one
    pub fn sole_child(&self) -> Option<&Node> {
        match self.children.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(ElementKind::from_tag("H1"), ElementKind::H1);
        assert_eq!(ElementKind::from_tag("tfoot"), ElementKind::TableFooter);
        assert_eq!(ElementKind::from_tag("span"), ElementKind::Other);
        assert_eq!(ElementKind::from_tag("h4"), ElementKind::Other);
        assert_eq!(ElementKind::H2.heading_level(), Some(2));
        assert_eq!(ElementKind::Paragraph.heading_level(), None);
        assert!(ElementKind::TableDataCell.is_table_part());
        assert!(!ElementKind::UnorderedList.is_table_part());
    }

    #[test]
    fn test_attr_lookup() {
        let node = Node::element_with_attrs("a", &[("HREF", "http://example.com/")], vec![]);
        let element = node.as_element().unwrap();
        assert_eq!(element.tag, "a");
        assert_eq!(element.kind, ElementKind::Anchor);
        assert_eq!(element.attr("href"), Some("http://example.com/"));
        assert_eq!(element.attr("alt"), None);
    }

    #[test]
    fn test_sole_child_and_text_content() {
        let node = Node::element(
            "p",
            vec![
                Node::text("Hello "),
                Node::element("b", vec![Node::text("world")]),
            ],
        );
        let element = node.as_element().unwrap();
        assert!(element.sole_child().is_none());
        assert_eq!(node.text_content(), "Hello world");

        let single = Node::element("a", vec![Node::text("Link")]);
        assert!(matches!(
            single.as_element().unwrap().sole_child(),
            Some(Node::Text { .. })
        ));
    }

    #[test]
    fn test_node_serialization() {
        let node = Node::element_with_attrs("img", &[("src", "cat.png")], vec![]);
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"element\""));
        assert!(json.contains("\"kind\":\"image\""));
        assert!(json.contains("cat.png"));
    }
}
