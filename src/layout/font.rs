//! Font metrics and per-block styles for layout

use crate::config::{DocumentConfig, CHARS_PER_LINE};
use crate::document::BlockKind;
use rustc_hash::FxHashMap;
use serde::Serialize;
use unicode_width::UnicodeWidthChar;

/// Metrics needed for text layout on a character grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Font size in points; a full-width character advances by this much
    pub font_size: f32,
    /// Extra advance after every visible character
    pub letter_spacing: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            letter_spacing: 0.0,
        }
    }
}

impl FontMetrics {
    pub fn new(font_size: f32, letter_spacing: f32) -> Self {
        Self {
            font_size,
            letter_spacing,
        }
    }

    /// Get advance width of a character
    pub fn width(&self, c: char) -> f32 {
        match c.width() {
            Some(0) | None => 0.0,
            Some(columns) => columns as f32 * self.font_size * 0.5 + self.letter_spacing,
        }
    }

    /// Get advance width of a string
    pub fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|c| self.width(c)).sum()
    }
}

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Justify,
    Center,
    Right,
}

impl Alignment {
    pub fn name(&self) -> &'static str {
        match self {
            Alignment::Justify => "justify",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Resolved typesetting style of one block kind
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStyle {
    pub font_family: String,
    pub metrics: FontMetrics,
    /// Fixed line height in points
    pub line_height: f32,
    pub bold: bool,
    pub alignment: Alignment,
    /// Indent of the first line, in points (whole grid characters)
    pub first_line_indent: f32,
    /// Indent of every line from the left, in points
    pub left_indent: f32,
    /// Indent of every line from the right, in points
    pub right_indent: f32,
    /// Vertical space above the block, in points
    pub space_before: f32,
}

impl BlockStyle {
    fn body(config: &DocumentConfig, letter_spacing: f32) -> Self {
        let body = &config.body;
        Self {
            font_family: body.font_family.clone(),
            metrics: FontMetrics::new(body.font_size, letter_spacing),
            line_height: body.line_spacing,
            bold: false,
            alignment: Alignment::Justify,
            first_line_indent: body.first_line_indent * (body.font_size + letter_spacing),
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
        }
    }

    /// Width left for text on a line
    pub fn line_width(&self, content_width: f32, first_line: bool) -> f32 {
        let indent = if first_line { self.first_line_indent } else { 0.0 };
        (content_width - self.left_indent - self.right_indent - indent).max(0.0)
    }
}

/// Styles for every block kind, derived from a configuration
#[derive(Debug, Clone)]
pub struct StyleSheet {
    styles: FxHashMap<BlockKind, BlockStyle>,
    body: BlockStyle,
}

impl StyleSheet {
    /// Build the style sheet for a content width.
    ///
    /// Letter spacing is chosen so exactly [`CHARS_PER_LINE`] body characters
    /// fill the content width.
    pub fn from_config(config: &DocumentConfig, content_width: f32) -> Self {
        let letter_spacing = content_width / CHARS_PER_LINE as f32 - config.body.font_size;
        let body = BlockStyle::body(config, letter_spacing);
        let mut styles = FxHashMap::default();

        styles.insert(
            BlockKind::Title,
            BlockStyle {
                font_family: config.title.font_family.clone(),
                metrics: FontMetrics::new(config.title.font_size, letter_spacing),
                line_height: config.title.line_spacing,
                alignment: Alignment::Center,
                first_line_indent: 0.0,
                ..body.clone()
            },
        );
        styles.insert(
            BlockKind::Heading1,
            BlockStyle {
                font_family: config.headings.h1.font_family.clone(),
                metrics: FontMetrics::new(config.headings.h1.font_size, letter_spacing),
                ..body.clone()
            },
        );
        styles.insert(
            BlockKind::Heading2,
            BlockStyle {
                font_family: config.headings.h2.font_family.clone(),
                metrics: FontMetrics::new(config.headings.h2.font_size, letter_spacing),
                ..body.clone()
            },
        );
        styles.insert(
            BlockKind::Heading3,
            BlockStyle {
                font_family: config.advanced.h3.font_family.clone(),
                bold: true,
                ..body.clone()
            },
        );
        styles.insert(BlockKind::Heading4, body.clone());
        styles.insert(BlockKind::Paragraph, body.clone());
        styles.insert(
            BlockKind::Addressee,
            BlockStyle {
                first_line_indent: 0.0,
                space_before: body.line_height,
                ..body.clone()
            },
        );
        styles.insert(
            BlockKind::Attachment,
            BlockStyle {
                first_line_indent: 0.0,
                left_indent: body.first_line_indent,
                space_before: body.line_height,
                ..body.clone()
            },
        );
        styles.insert(
            BlockKind::Date,
            BlockStyle {
                alignment: Alignment::Right,
                first_line_indent: 0.0,
                right_indent: 4.0 * config.body.font_size,
                ..body.clone()
            },
        );

        Self { styles, body }
    }

    /// Get the style of a block kind
    pub fn get(&self, kind: BlockKind) -> &BlockStyle {
        self.styles.get(&kind).unwrap_or(&self.body)
    }

    /// The plain body style (also used for header and footer notes)
    pub fn body(&self) -> &BlockStyle {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_half_width() {
        let metrics = FontMetrics::new(16.0, 0.0);
        assert_eq!(metrics.width('中'), 16.0);
        assert_eq!(metrics.width('，'), 16.0);
        assert_eq!(metrics.width('a'), 8.0);
        assert_eq!(metrics.width('1'), 8.0);
        assert_eq!(metrics.width('\u{0301}'), 0.0);
    }

    #[test]
    fn test_letter_spacing_fits_chars_per_line() {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::from_config(&config, 448.0 - 28.0);
        let body = sheet.get(BlockKind::Paragraph);
        assert_eq!(body.metrics.letter_spacing, -1.0);

        let line: String = std::iter::repeat('中').take(CHARS_PER_LINE).collect();
        assert!((body.metrics.text_width(&line) - 420.0).abs() < 1e-3);
    }

    #[test]
    fn test_kind_styles() {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::from_config(&config, 448.0);

        let title = sheet.get(BlockKind::Title);
        assert_eq!(title.alignment, Alignment::Center);
        assert_eq!(title.metrics.font_size, 22.0);
        assert_eq!(title.first_line_indent, 0.0);

        let paragraph = sheet.get(BlockKind::Paragraph);
        assert_eq!(paragraph.first_line_indent, 32.0);
        assert_eq!(paragraph.line_height, 29.0);

        assert!(sheet.get(BlockKind::Heading3).bold);
        assert_eq!(sheet.get(BlockKind::Heading1).font_family, "黑体");
        assert_eq!(sheet.get(BlockKind::Addressee).space_before, 29.0);
        assert_eq!(sheet.get(BlockKind::Attachment).left_indent, 32.0);
        assert_eq!(sheet.get(BlockKind::Date).right_indent, 64.0);
    }

    #[test]
    fn test_heading3_font_from_advanced() {
        let sheet = StyleSheet::from_config(&DocumentConfig::default(), 448.0);
        assert_eq!(sheet.get(BlockKind::Heading3).font_family, "仿宋_GB2312");

        let config =
            DocumentConfig::from_json(r#"{"advanced": {"h3": {"fontFamily": "楷体"}}}"#).unwrap();
        let sheet = StyleSheet::from_config(&config, 448.0);
        let heading3 = sheet.get(BlockKind::Heading3);
        assert_eq!(heading3.font_family, "楷体");
        assert!(heading3.bold);
        assert_eq!(sheet.get(BlockKind::Heading4).font_family, "仿宋_GB2312");
    }

    #[test]
    fn test_line_width() {
        let config = DocumentConfig::default();
        let sheet = StyleSheet::from_config(&config, 448.0);
        let paragraph = sheet.get(BlockKind::Paragraph);
        assert_eq!(paragraph.line_width(448.0, true), 416.0);
        assert_eq!(paragraph.line_width(448.0, false), 448.0);
    }
}
