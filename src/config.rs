//! Typesetting configuration
//!
//! Defaults follow GB/T 9704 for A4 official documents. Sizes are in points
//! (the preview renders at 72 dpi, so 1 pt is 1 px) and margins in
//! centimetres, as users enter them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A4 page width in points
pub const A4_WIDTH_PT: f32 = 595.28;

/// A4 page height in points
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Body characters per line required by GB/T 9704
pub const CHARS_PER_LINE: usize = 28;

/// Points per centimetre
pub const PT_PER_CM: f32 = 72.0 / 2.54;

/// Convert centimetres to points
pub fn cm_to_pt(cm: f32) -> f32 {
    cm * PT_PER_CM
}

/// Page margins in centimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarginsConfig {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for MarginsConfig {
    fn default() -> Self {
        Self {
            top: 3.7,
            bottom: 3.5,
            left: 2.8,
            right: 2.6,
        }
    }
}

/// Document title format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TitleConfig {
    pub font_family: String,
    pub font_size: f32,
    /// Fixed line spacing in points
    pub line_spacing: f32,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            font_family: "方正小标宋_GBK".to_string(),
            font_size: 22.0,
            line_spacing: 29.0,
        }
    }
}

/// Font of one heading level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeadingFont {
    pub font_family: String,
    pub font_size: f32,
}

impl Default for HeadingFont {
    fn default() -> Self {
        Self {
            font_family: "黑体".to_string(),
            font_size: 16.0,
        }
    }
}

/// Fonts of the first two heading levels; level 3 takes its face from
/// [`AdvancedConfig`], level 4 uses the body font
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingsConfig {
    pub h1: HeadingFont,
    pub h2: HeadingFont,
}

impl Default for HeadingsConfig {
    fn default() -> Self {
        Self {
            h1: HeadingFont::default(),
            h2: HeadingFont {
                font_family: "楷体_GB2312".to_string(),
                font_size: 16.0,
            },
        }
    }
}

/// Body text format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyConfig {
    pub font_family: String,
    pub font_size: f32,
    /// Fixed line spacing in points
    pub line_spacing: f32,
    /// First-line indent in characters
    pub first_line_indent: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            font_family: "仿宋_GB2312".to_string(),
            font_size: 16.0,
            line_spacing: 29.0,
            first_line_indent: 2.0,
        }
    }
}

/// Optional presentation switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecialOptionsConfig {
    pub bold_first_sentence: bool,
    pub show_page_number: bool,
    pub page_number_font: String,
}

impl Default for SpecialOptionsConfig {
    fn default() -> Self {
        Self {
            bold_first_sentence: false,
            show_page_number: true,
            page_number_font: "宋体".to_string(),
        }
    }
}

/// Per-element font override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedElementConfig {
    /// Chinese font
    pub font_family: String,
    /// Font for Latin letters and digits; empty follows `font_family`
    pub ascii_font_family: String,
    pub font_size: f32,
}

impl AdvancedElementConfig {
    fn new(font_family: &str) -> Self {
        Self {
            font_family: font_family.to_string(),
            ascii_font_family: "Times New Roman".to_string(),
            font_size: 16.0,
        }
    }
}

impl Default for AdvancedElementConfig {
    fn default() -> Self {
        Self::new("仿宋_GB2312")
    }
}

/// Advanced font settings of the addressee and the first three heading levels.
///
/// The preview applies `h3.fontFamily` to level-3 headings; the other entries
/// are carried for exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedConfig {
    pub addressee: AdvancedElementConfig,
    pub h1: AdvancedElementConfig,
    pub h2: AdvancedElementConfig,
    pub h3: AdvancedElementConfig,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            addressee: AdvancedElementConfig::default(),
            h1: AdvancedElementConfig::new("黑体"),
            h2: AdvancedElementConfig::new("楷体_GB2312"),
            h3: AdvancedElementConfig::default(),
        }
    }
}

/// Issuing-organ header printed on the first page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderConfig {
    pub enabled: bool,
    /// e.g. "XX市人民政府文件"
    pub organ: String,
    /// e.g. "X政发〔2025〕1号"
    pub document_number: String,
}

impl HeaderConfig {
    /// Whether the header takes space on the first page
    pub fn is_visible(&self) -> bool {
        self.enabled && !(self.organ.trim().is_empty() && self.document_number.trim().is_empty())
    }
}

/// Copy-to and printing note at the bottom of the last page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterNoteConfig {
    pub enabled: bool,
    /// 抄送 line, without the prefix
    pub copy_to: String,
    /// Printing organ
    pub printer: String,
    /// Printing date, e.g. "2025年10月21日印发"
    pub print_date: String,
}

impl FooterNoteConfig {
    /// Whether the footer note takes space on the last page
    pub fn is_visible(&self) -> bool {
        self.enabled
            && !(self.copy_to.trim().is_empty()
                && self.printer.trim().is_empty()
                && self.print_date.trim().is_empty())
    }
}

/// Complete document configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentConfig {
    pub margins: MarginsConfig,
    pub title: TitleConfig,
    pub headings: HeadingsConfig,
    pub body: BodyConfig,
    pub special_options: SpecialOptionsConfig,
    pub advanced: AdvancedConfig,
    pub header: HeaderConfig,
    pub footer_note: FooterNoteConfig,
}

impl DocumentConfig {
    /// Parse a (possibly partial) JSON configuration on top of the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply_patch(json)?;
        Ok(config)
    }

    /// Deep-merge a partial JSON patch into this configuration.
    ///
    /// Objects merge key by key; any other value replaces the target.
    /// On error the configuration is left unchanged.
    pub fn apply_patch(&mut self, json: &str) -> Result<()> {
        let patch: Value = serde_json::from_str(json)?;
        if !patch.is_object() {
            return Err(Error::InvalidConfig(
                "configuration patch must be a JSON object".to_string(),
            ));
        }

        let mut merged = serde_json::to_value(&*self)?;
        merge_value(&mut merged, patch);
        let updated: DocumentConfig = serde_json::from_value(merged)?;
        updated.validate()?;

        *self = updated;
        Ok(())
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the layout engine cannot use
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("title.fontSize", self.title.font_size),
            ("title.lineSpacing", self.title.line_spacing),
            ("headings.h1.fontSize", self.headings.h1.font_size),
            ("headings.h2.fontSize", self.headings.h2.font_size),
            ("body.fontSize", self.body.font_size),
            ("body.lineSpacing", self.body.line_spacing),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let margins = [
            self.margins.top,
            self.margins.bottom,
            self.margins.left,
            self.margins.right,
        ];
        if margins.iter().any(|m| !(m.is_finite() && *m >= 0.0)) {
            return Err(Error::InvalidConfig(
                "margins must be non-negative".to_string(),
            ));
        }
        if cm_to_pt(self.margins.top + self.margins.bottom) >= A4_HEIGHT_PT {
            return Err(Error::InvalidConfig(
                "vertical margins leave no content height".to_string(),
            ));
        }
        if cm_to_pt(self.margins.left + self.margins.right) >= A4_WIDTH_PT {
            return Err(Error::InvalidConfig(
                "horizontal margins leave no content width".to_string(),
            ));
        }
        if !(self.body.first_line_indent.is_finite() && self.body.first_line_indent >= 0.0) {
            return Err(Error::InvalidConfig(
                "body.firstLineIndent must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn merge_value(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_value(existing, value)
                    }
                    _ if value.is_null() => {}
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DocumentConfig::default();
        assert_eq!(config.body.font_size, 16.0);
        assert_eq!(config.body.line_spacing, 29.0);
        assert_eq!(config.title.font_size, 22.0);
        assert_eq!(config.margins.top, 3.7);
        assert!(config.special_options.show_page_number);
        assert!(!config.header.is_visible());
        assert!(!config.footer_note.is_visible());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cm_to_pt() {
        assert!((cm_to_pt(2.54) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_patch_keeps_unspecified_defaults() {
        let mut config = DocumentConfig::default();
        config
            .apply_patch(r#"{"body": {"fontSize": 15}, "margins": {"top": 3.0}}"#)
            .unwrap();

        assert_eq!(config.body.font_size, 15.0);
        assert_eq!(config.body.line_spacing, 29.0);
        assert_eq!(config.body.font_family, "仿宋_GB2312");
        assert_eq!(config.margins.top, 3.0);
        assert_eq!(config.margins.bottom, 3.5);
    }

    #[test]
    fn test_patch_nested_heading() {
        let config =
            DocumentConfig::from_json(r#"{"headings": {"h2": {"fontFamily": "楷体"}}}"#).unwrap();
        assert_eq!(config.headings.h2.font_family, "楷体");
        assert_eq!(config.headings.h2.font_size, 16.0);
        assert_eq!(config.headings.h1.font_family, "黑体");
    }

    #[test]
    fn test_patch_advanced_section() {
        let config = DocumentConfig::from_json(
            r#"{"advanced": {"h3": {"fontFamily": "楷体", "asciiFontFamily": ""}}}"#,
        )
        .unwrap();
        assert_eq!(config.advanced.h3.font_family, "楷体");
        assert_eq!(config.advanced.h3.ascii_font_family, "");
        assert_eq!(config.advanced.h3.font_size, 16.0);
        assert_eq!(config.advanced.h1.font_family, "黑体");
        assert_eq!(config.advanced.addressee.ascii_font_family, "Times New Roman");
    }

    #[test]
    fn test_patch_null_is_ignored() {
        let config = DocumentConfig::from_json(r#"{"title": null}"#).unwrap();
        assert_eq!(config.title, TitleConfig::default());
    }

    #[test]
    fn test_invalid_patch_leaves_config_unchanged() {
        let mut config = DocumentConfig::default();
        let err = config
            .apply_patch(r#"{"body": {"lineSpacing": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(config.body.line_spacing, 29.0);

        assert!(matches!(
            config.apply_patch("[1, 2]").unwrap_err(),
            Error::InvalidConfig(_)
        ));
        assert!(matches!(
            config.apply_patch("{").unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_margins_must_leave_content() {
        let err = DocumentConfig::from_json(r#"{"margins": {"top": 20, "bottom": 10}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_header_visibility() {
        let config = DocumentConfig::from_json(
            r#"{"header": {"enabled": true, "organ": "XX市人民政府文件"}}"#,
        )
        .unwrap();
        assert!(config.header.is_visible());

        let config = DocumentConfig::from_json(r#"{"header": {"enabled": true}}"#).unwrap();
        assert!(!config.header.is_visible());
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let json = DocumentConfig::default().to_json().unwrap();
        assert!(json.contains("\"specialOptions\""));
        assert!(json.contains("\"firstLineIndent\""));
        assert_eq!(DocumentConfig::from_json(&json).unwrap(), DocumentConfig::default());
    }
}
