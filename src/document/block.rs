//! Block-level elements of an official document

use serde::Serialize;

/// The kind of block element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Document title, the first non-blank line
    Title,
    /// 一、
    #[serde(rename = "heading-1")]
    Heading1,
    /// （一）
    #[serde(rename = "heading-2")]
    Heading2,
    /// 1.
    #[serde(rename = "heading-3")]
    Heading3,
    /// （1）
    #[serde(rename = "heading-4")]
    Heading4,
    /// Regular body paragraph
    Paragraph,
    /// Main recipient line directly after the title, ends with a colon
    Addressee,
    /// 附件： line
    Attachment,
    /// Full signing date line
    Date,
}

impl Default for BlockKind {
    fn default() -> Self {
        BlockKind::Paragraph
    }
}

impl BlockKind {
    /// All kinds, in declaration order
    pub const ALL: [BlockKind; 9] = [
        BlockKind::Title,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
        BlockKind::Heading4,
        BlockKind::Paragraph,
        BlockKind::Addressee,
        BlockKind::Attachment,
        BlockKind::Date,
    ];

    /// Heading level (1-4), if this is a numbered heading
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            BlockKind::Heading1 => Some(1),
            BlockKind::Heading2 => Some(2),
            BlockKind::Heading3 => Some(3),
            BlockKind::Heading4 => Some(4),
            _ => None,
        }
    }

    /// Check if this is a numbered heading
    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Kinds that typeset like body text: justified with a first-line indent
    pub fn is_body_text(&self) -> bool {
        matches!(self, BlockKind::Paragraph) || self.is_heading()
    }

    /// Stable name used by renderers and the JSON bridge
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Title => "title",
            BlockKind::Heading1 => "heading-1",
            BlockKind::Heading2 => "heading-2",
            BlockKind::Heading3 => "heading-3",
            BlockKind::Heading4 => "heading-4",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Addressee => "addressee",
            BlockKind::Attachment => "attachment",
            BlockKind::Date => "date",
        }
    }
}

/// One classified unit of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// The kind of block
    pub kind: BlockKind,
    /// Trimmed source text, never empty
    pub text: String,
    /// 1-based line number in the source text
    pub source_line: usize,
}

impl Block {
    /// Create a new block
    pub fn new(kind: BlockKind, text: impl Into<String>, source_line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            source_line,
        }
    }

    /// Split the text after its first `。`.
    ///
    /// Returns `None` when there is no full stop or it is the last character,
    /// i.e. the whole block is a single sentence.
    pub fn lead_sentence(&self) -> Option<(&str, &str)> {
        let idx = self.text.find('。')?;
        let split = idx + '。'.len_utf8();
        if split == self.text.len() {
            return None;
        }
        Some(self.text.split_at(split))
    }
}
