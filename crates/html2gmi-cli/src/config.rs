//! Configuration file support for html2gmi CLI
//!
//! Loads settings from `_html2gmi.toml` configuration file.

use anyhow::{Context, Result};
use html2gmi_core::{CellAlign, PrettyTableOptions, RenderOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_html2gmi.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/html2gmi/html2gmi/main/crates/html2gmi-cli/schema/html2gmi.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Link citation configuration
    #[serde(skip_serializing_if = "LinksConfig::is_empty")]
    pub links: LinksConfig,
    /// Image configuration
    #[serde(skip_serializing_if = "ImagesConfig::is_empty")]
    pub images: ImagesConfig,
    /// Table rendering configuration
    #[serde(skip_serializing_if = "TablesConfig::is_empty")]
    pub tables: TablesConfig,
    /// Document-level configuration
    #[serde(skip_serializing_if = "DocumentConfig::is_empty")]
    pub document: DocumentConfig,
}

/// Link citation configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct LinksConfig {
    /// Drop all links, keeping only their text (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit: Option<bool>,
    /// Number of the first citation (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_start: Option<usize>,
    /// Write `[n]` markers after linked text (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_markers: Option<bool>,
    /// Include `[n]` in the link lines (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbered: Option<bool>,
    /// Paragraphs between automatic link-line blocks (default: 2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_frequency: Option<usize>,
    /// List items and paragraphs with one link and fewer words than this
    /// become a single link line (default: 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_item_word_threshold: Option<usize>,
    /// Link text used for links wrapping only an image (default: ">>")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_link_prefix: Option<String>,
}

impl LinksConfig {
    fn is_empty(&self) -> bool {
        self.omit.is_none()
            && self.citation_start.is_none()
            && self.citation_markers.is_none()
            && self.numbered.is_none()
            && self.emit_frequency.is_none()
            && self.list_item_word_threshold.is_none()
            && self.empty_link_prefix.is_none()
    }
}

/// Image configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ImagesConfig {
    /// Cite image sources as links (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_links: Option<bool>,
    /// Text shown before an image description (default: "‡")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_prefix: Option<String>,
}

impl ImagesConfig {
    fn is_empty(&self) -> bool {
        self.as_links.is_none() && self.marker_prefix.is_none()
    }
}

/// Cell alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Default,
    Left,
    Center,
    Right,
}

impl From<Alignment> for CellAlign {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::Default => CellAlign::Default,
            Alignment::Left => CellAlign::Left,
            Alignment::Center => CellAlign::Center,
            Alignment::Right => CellAlign::Right,
        }
    }
}

/// Table rendering configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct TablesConfig {
    /// Draw tables as text grids instead of flattening them (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
    /// Uppercase header and footer cells (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_format_header: Option<bool>,
    /// Wrap cells wider than `col_width` (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_wrap_text: Option<bool>,
    /// Refill a wrapped cell as one paragraph (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflow: Option<bool>,
    /// Column width used for wrapping (default: 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_width: Option<usize>,
    /// Vertical separator (default: "|")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_separator: Option<char>,
    /// Horizontal separator (default: "-")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_separator: Option<char>,
    /// Corner and crossing character (default: "+")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_separator: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_alignment: Option<Alignment>,
    /// Body cell alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Per-column body alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_alignment: Option<Vec<Alignment>>,
    /// Line under the header row (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_line: Option<bool>,
    /// Line between every row (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_line: Option<bool>,
    /// Merge vertically adjacent identical cells (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_merge_cells: Option<bool>,
    /// Line ending inside the grid (default: "\n")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<String>,
    /// Outer borders
    #[serde(skip_serializing_if = "BordersConfig::is_empty")]
    pub borders: BordersConfig,
}

impl TablesConfig {
    fn is_empty(&self) -> bool {
        self.pretty.is_none()
            && self.auto_format_header.is_none()
            && self.auto_wrap_text.is_none()
            && self.reflow.is_none()
            && self.col_width.is_none()
            && self.column_separator.is_none()
            && self.row_separator.is_none()
            && self.center_separator.is_none()
            && self.header_alignment.is_none()
            && self.footer_alignment.is_none()
            && self.alignment.is_none()
            && self.column_alignment.is_none()
            && self.header_line.is_none()
            && self.row_line.is_none()
            && self.auto_merge_cells.is_none()
            && self.new_line.is_none()
            && self.borders.is_empty()
    }

    fn apply(&self, style: &mut PrettyTableOptions) {
        set(&mut style.auto_format_header, self.auto_format_header);
        set(&mut style.auto_wrap_text, self.auto_wrap_text);
        set(&mut style.reflow_during_auto_wrap, self.reflow);
        set(&mut style.col_width, self.col_width);
        set(&mut style.column_separator, self.column_separator);
        set(&mut style.row_separator, self.row_separator);
        set(&mut style.center_separator, self.center_separator);
        set(&mut style.header_alignment, self.header_alignment.map(Into::into));
        set(&mut style.footer_alignment, self.footer_alignment.map(Into::into));
        set(&mut style.alignment, self.alignment.map(Into::into));
        if let Some(columns) = &self.column_alignment {
            style.column_alignment = columns.iter().copied().map(Into::into).collect();
        }
        set(&mut style.header_line, self.header_line);
        set(&mut style.row_line, self.row_line);
        set(&mut style.auto_merge_cells, self.auto_merge_cells);
        set(&mut style.new_line, self.new_line.clone());
        set(&mut style.borders.left, self.borders.left);
        set(&mut style.borders.right, self.borders.right);
        set(&mut style.borders.top, self.borders.top);
        set(&mut style.borders.bottom, self.borders.bottom);
    }
}

/// Outer table borders (all default to true)
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct BordersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<bool>,
}

impl BordersConfig {
    fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// Document-level configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct DocumentConfig {
    /// Drop `<nav>` and `<footer>` content (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_navigation: Option<bool>,
}

impl DocumentConfig {
    fn is_empty(&self) -> bool {
        self.skip_navigation.is_none()
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_html2gmi.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Overlay the configured values onto `options`
    pub fn apply(&self, options: &mut RenderOptions) {
        let links = &self.links;
        set(&mut options.omit_links, links.omit);
        set(&mut options.citation_start, links.citation_start);
        set(&mut options.citation_markers, links.citation_markers);
        set(&mut options.numbered_links, links.numbered);
        set(&mut options.link_emit_frequency, links.emit_frequency);
        set(
            &mut options.list_item_link_word_threshold,
            links.list_item_word_threshold,
        );
        set(&mut options.empty_link_prefix, links.empty_link_prefix.clone());

        set(&mut options.emit_images_as_links, self.images.as_links);
        set(
            &mut options.image_marker_prefix,
            self.images.marker_prefix.clone(),
        );

        set(&mut options.pretty_tables, self.tables.pretty);
        self.tables.apply(&mut options.table_style);

        set(&mut options.skip_navigation, self.document.skip_navigation);
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out
    pub fn sample() -> Self {
        let defaults = RenderOptions::default();
        let style = &defaults.table_style;
        Config {
            links: LinksConfig {
                omit: Some(defaults.omit_links),
                citation_start: Some(defaults.citation_start),
                citation_markers: Some(defaults.citation_markers),
                numbered: Some(defaults.numbered_links),
                emit_frequency: Some(defaults.link_emit_frequency),
                list_item_word_threshold: Some(defaults.list_item_link_word_threshold),
                empty_link_prefix: Some(defaults.empty_link_prefix.clone()),
            },
            images: ImagesConfig {
                as_links: Some(defaults.emit_images_as_links),
                marker_prefix: Some(defaults.image_marker_prefix.clone()),
            },
            tables: TablesConfig {
                pretty: Some(defaults.pretty_tables),
                col_width: Some(style.col_width),
                header_line: Some(style.header_line),
                row_line: Some(style.row_line),
                auto_merge_cells: Some(style.auto_merge_cells),
                ..Default::default()
            },
            document: DocumentConfig {
                skip_navigation: Some(defaults.skip_navigation),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.links.omit.is_none());
        assert!(config.tables.pretty.is_none());
    }

    #[test]
    fn test_parse_links_section() {
        let config: Config = toml::from_str(
            r#"
            [links]
            omit = false
            citation_start = 10
            numbered = false
            emit_frequency = 0
            empty_link_prefix = "(image)"
            "#,
        )
        .unwrap();

        assert_eq!(config.links.omit, Some(false));
        assert_eq!(config.links.citation_start, Some(10));
        assert_eq!(config.links.numbered, Some(false));
        assert_eq!(config.links.emit_frequency, Some(0));
        assert_eq!(config.links.empty_link_prefix, Some("(image)".to_string()));
    }

    #[test]
    fn test_parse_tables_section() {
        let config: Config = toml::from_str(
            r#"
            [tables]
            pretty = true
            col_width = 40
            column_separator = "!"
            header_alignment = "left"
            column_alignment = ["right", "default"]

            [tables.borders]
            top = false
            "#,
        )
        .unwrap();

        assert_eq!(config.tables.pretty, Some(true));
        assert_eq!(config.tables.col_width, Some(40));
        assert_eq!(config.tables.column_separator, Some('!'));
        assert_eq!(config.tables.header_alignment, Some(Alignment::Left));
        assert_eq!(
            config.tables.column_alignment,
            Some(vec![Alignment::Right, Alignment::Default])
        );
        assert_eq!(config.tables.borders.top, Some(false));
        assert!(config.tables.borders.left.is_none());
    }

    #[test]
    fn test_invalid_alignment_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [tables]
            alignment = "justify"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overlays_defaults() {
        let config: Config = toml::from_str(
            r#"
            [links]
            citation_start = 3
            [images]
            marker_prefix = "IMG"
            [tables]
            pretty = true
            row_line = true
            auto_merge_cells = true
            new_line = "\r\n"
            [tables.borders]
            left = false
            [document]
            skip_navigation = false
            "#,
        )
        .unwrap();

        let mut options = RenderOptions::default();
        config.apply(&mut options);

        assert_eq!(options.citation_start, 3);
        assert_eq!(options.image_marker_prefix, "IMG");
        assert!(options.pretty_tables);
        assert!(options.table_style.row_line);
        assert!(options.table_style.auto_merge_cells);
        assert_eq!(options.table_style.new_line, "\r\n");
        assert!(!options.table_style.borders.left);
        assert!(options.table_style.borders.right);
        assert!(!options.skip_navigation);
        // Untouched values keep their defaults
        assert!(options.numbered_links);
        assert_eq!(options.link_emit_frequency, 2);
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(!toml.contains("[links]"));
        assert!(!toml.contains("[tables"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(toml.contains("[links]"));
        assert!(toml.contains("citation_start = 1"));
        assert!(toml.contains("[tables]"));
        assert!(!toml.contains("[tables.borders]"));
    }

    #[test]
    fn test_sample_matches_defaults() {
        let mut options = RenderOptions::default();
        Config::sample().apply(&mut options);
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("LinksConfig"));
        assert!(schema.contains("TablesConfig"));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.links.citation_start, parsed.links.citation_start);
        assert_eq!(config.images.marker_prefix, parsed.images.marker_prefix);
    }
}
