//! Document model: classified blocks of an official document

mod block;
mod classify;
mod sanitize;

pub use block::{Block, BlockKind};
pub use classify::{classify, detect_kind};
pub use sanitize::{normalize_imported_text, sanitize_text, SanitizeReport};

use serde::Serialize;

/// A classified document.
///
/// Rebuilt wholesale from text on every change; blocks are never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// The title block, present unless the text is blank
    pub title: Option<Block>,
    /// Every block after the title, in source order
    pub body: Vec<Block>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify text into a document
    pub fn from_text(text: &str) -> Self {
        classify(text)
    }

    pub(crate) fn from_parts(title: Option<Block>, body: Vec<Block>) -> Self {
        Self { title, body }
    }

    /// Check if the document has no blocks at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_empty()
    }

    /// Total block count, title included
    pub fn block_count(&self) -> usize {
        self.title.iter().count() + self.body.len()
    }

    /// Blocks in flow order: title first, then body
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.title.iter().chain(self.body.iter())
    }

    /// Get a block by its flow index
    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks().nth(index)
    }

    /// The addressee block, if any
    pub fn addressee(&self) -> Option<&Block> {
        self.body
            .first()
            .filter(|block| block.kind == BlockKind::Addressee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.block_count(), 0);
        assert_eq!(doc.blocks().count(), 0);
    }

    #[test]
    fn test_blocks_in_flow_order() {
        let doc = Document::from_text("通知\n各单位：\n一、总体要求");
        let kinds: Vec<_> = doc.blocks().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![BlockKind::Title, BlockKind::Addressee, BlockKind::Heading1]
        );
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.block(2).map(|b| b.text.as_str()), Some("一、总体要求"));
        assert_eq!(doc.addressee().map(|b| b.source_line), Some(2));
    }

    #[test]
    fn test_serialize_json() {
        let doc = Document::from_text("通知\n2025年10月21日");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["title"]["kind"], "title");
        assert_eq!(json["body"][0]["kind"], "date");
        assert_eq!(json["body"][0]["sourceLine"], 2);
    }
}
