//! Plain text to document model

use crate::document::{Block, BlockKind, Document};
use regex::Regex;
use std::sync::OnceLock;

fn heading1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[一二三四五六七八九十]+、").expect("heading 1 pattern"))
}

fn heading2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[（(][一二三四五六七八九十]+[）)]").expect("heading 2 pattern")
    })
}

fn heading3_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+[.．]").expect("heading 3 pattern"))
}

fn heading4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[（(][0-9]+[）)]").expect("heading 4 pattern"))
}

fn attachment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^附件[：:]").expect("attachment pattern"))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}年[0-9]{1,2}月[0-9]{1,2}日$").expect("date pattern")
    })
}

/// Detect the kind of a single line by pattern alone.
///
/// Title and addressee depend on position and are decided by [`classify`].
/// Attachment is tested before the headings so that `附件：1.xxx` is not
/// taken for a level-3 heading.
pub fn detect_kind(line: &str) -> BlockKind {
    let trimmed = trim_line(line);

    if attachment_re().is_match(trimmed) {
        BlockKind::Attachment
    } else if date_re().is_match(trimmed) {
        BlockKind::Date
    } else if heading1_re().is_match(trimmed) {
        BlockKind::Heading1
    } else if heading2_re().is_match(trimmed) {
        BlockKind::Heading2
    } else if heading3_re().is_match(trimmed) {
        BlockKind::Heading3
    } else if heading4_re().is_match(trimmed) {
        BlockKind::Heading4
    } else {
        BlockKind::Paragraph
    }
}

/// Trim whitespace and byte-order marks from both ends
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

fn is_addressee(trimmed: &str) -> bool {
    (trimmed.ends_with('：') || trimmed.ends_with(':')) && !heading1_re().is_match(trimmed)
}

/// Classify plain text into a [`Document`].
///
/// Never fails: empty or whitespace-only input yields an empty document.
pub fn classify(text: &str) -> Document {
    let mut title = None;
    let mut body = Vec::new();
    let mut addressee_checked = false;

    for (idx, raw) in text.split('\n').enumerate() {
        let trimmed = trim_line(raw);
        if trimmed.is_empty() {
            continue;
        }
        let source_line = idx + 1;

        if title.is_none() {
            title = Some(Block::new(BlockKind::Title, trimmed, source_line));
            continue;
        }

        if !addressee_checked {
            addressee_checked = true;
            if is_addressee(trimmed) {
                body.push(Block::new(BlockKind::Addressee, trimmed, source_line));
                continue;
            }
        }

        body.push(Block::new(detect_kind(trimmed), trimmed, source_line));
    }

    log::debug!(
        "classified {} body blocks (title: {})",
        body.len(),
        title.is_some()
    );

    Document::from_parts(title, body)
}
