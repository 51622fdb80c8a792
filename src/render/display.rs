//! Display list: render-ready pages

use crate::config::SpecialOptionsConfig;
use crate::document::{Block, BlockKind, Document};
use crate::layout::{
    Alignment, BlockExtent, BlockStyle, LayoutConstraints, LayoutState, LineLayout, NoteLayout,
    PageSlice,
};
use crate::{Point, Rect};
use serde::Serialize;

/// Text shown on an empty document
pub const PLACEHOLDER_TEXT: &str = "预览区域";

/// Unique identifier for a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItemId {
    /// Index in [`Document::blocks`] order
    pub block_index: u32,
    pub line_index: u32,
    pub run_index: u32,
}

impl DisplayItemId {
    pub fn new(block_index: usize, line_index: usize, run_index: usize) -> Self {
        Self {
            block_index: block_index as u32,
            line_index: line_index as u32,
            run_index: run_index as u32,
        }
    }
}

/// Font of a run of text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStyle {
    pub font_family: String,
    pub font_size: f32,
    pub letter_spacing: f32,
    pub bold: bool,
}

impl From<&BlockStyle> for RunStyle {
    fn from(style: &BlockStyle) -> Self {
        Self {
            font_family: style.font_family.clone(),
            font_size: style.metrics.font_size,
            letter_spacing: style.metrics.letter_spacing,
            bold: style.bold,
        }
    }
}

/// One line of a header or footer note
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteText {
    pub position: Point,
    pub text: String,
    pub style: RunStyle,
}

/// A display item to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DisplayItem {
    /// Text run of one visual line
    TextRun {
        id: DisplayItemId,
        /// Top-left of the line box, page coordinates
        position: Point,
        text: String,
        block_kind: BlockKind,
        style: RunStyle,
    },
    /// Issuing-organ header, first page only
    Header {
        rect: Rect,
        lines: Vec<NoteText>,
        /// Vertical position of the red rule
        rule_y: f32,
    },
    /// Copy-to and printing note, last page only
    FooterNote {
        rect: Rect,
        lines: Vec<NoteText>,
    },
    /// "— n —" below the content box
    PageNumber {
        position: Point,
        text: String,
        alignment: Alignment,
        font_family: String,
    },
    /// Shown instead of content when the document is empty
    Placeholder { position: Point, text: String },
}

impl DisplayItem {
    /// Get the ID of this item, if it has one
    pub fn id(&self) -> Option<DisplayItemId> {
        match self {
            DisplayItem::TextRun { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Display list for a single page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPage {
    pub page_index: usize,
    /// Page rectangle when pages are stacked vertically
    pub bounds: Rect,
    /// Window of the flow shown on this page
    pub slice: PageSlice,
    /// Content viewport in page coordinates
    pub clip: Rect,
    pub items: Vec<DisplayItem>,
}

/// Complete display list for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayList {
    pub pages: Vec<DisplayPage>,
}

impl DisplayList {
    /// Build display list from layout state
    pub fn build(document: &Document, layout: &LayoutState, options: &SpecialOptionsConfig) -> Self {
        let constraints = layout.constraints();
        let slices = layout.pages();
        let blocks: Vec<&Block> = document.blocks().collect();
        let page_count = slices.len();
        let mut pages = Vec::with_capacity(page_count);

        for (page_idx, slice) in slices.iter().enumerate() {
            let is_first = page_idx == 0;
            let is_last = page_idx + 1 == page_count;
            // Next page's offset, not `slice.end()`, so no span lands on two pages
            let window_end = slices.get(page_idx + 1).map(|next| next.offset);

            let content_top = if is_first {
                constraints.margin_top + layout.header().height
            } else {
                constraints.margin_top
            };
            let mut items = Vec::new();

            if is_first && !layout.header().is_empty() {
                items.push(header_item(layout.header(), layout, constraints));
            }

            for (block_idx, extent) in layout.flow().blocks.iter().enumerate() {
                if extent.bottom <= slice.offset {
                    continue;
                }
                if window_end.map_or(false, |end| extent.top >= end) {
                    break;
                }
                let Some(block) = blocks.get(block_idx) else {
                    continue;
                };

                for (line_idx, span_idx) in extent.span_range().enumerate() {
                    let span = layout.flow().spans[span_idx];
                    let on_page = span.top >= slice.offset
                        && window_end.map_or(true, |end| span.top < end);
                    if !on_page {
                        continue;
                    }
                    let style = layout.styles().get(block.kind);
                    let y = content_top + (span.bottom - style.line_height - slice.offset);
                    push_line_runs(
                        &mut items,
                        LineContext {
                            block,
                            block_idx,
                            extent,
                            line_idx,
                            y,
                        },
                        layout,
                        options,
                    );
                }
            }

            if blocks.is_empty() && is_first {
                items.push(DisplayItem::Placeholder {
                    position: Point {
                        x: constraints.margin_left,
                        y: content_top,
                    },
                    text: PLACEHOLDER_TEXT.to_string(),
                });
            }

            if is_last && !layout.footer_note().is_empty() {
                items.push(footer_item(layout.footer_note(), constraints));
            }

            if options.show_page_number {
                items.push(page_number_item(page_idx + 1, layout, options, constraints));
            }

            pages.push(DisplayPage {
                page_index: page_idx,
                bounds: Rect::new(
                    0.0,
                    page_idx as f32 * constraints.page_height,
                    constraints.page_width,
                    constraints.page_height,
                ),
                slice: *slice,
                clip: Rect::new(
                    constraints.margin_left,
                    content_top,
                    constraints.content_width(),
                    slice.height,
                ),
                items,
            });
        }

        DisplayList { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text runs of all pages, in order
    pub fn text_runs(&self) -> impl Iterator<Item = &DisplayItem> + '_ {
        self.pages
            .iter()
            .flat_map(|page| page.items.iter())
            .filter(|item| matches!(item, DisplayItem::TextRun { .. }))
    }
}

struct LineContext<'a> {
    block: &'a Block,
    block_idx: usize,
    extent: &'a BlockExtent,
    line_idx: usize,
    y: f32,
}

/// Emit one visual line, split where the emphasized lead sentence ends
fn push_line_runs(
    items: &mut Vec<DisplayItem>,
    line: LineContext<'_>,
    layout: &LayoutState,
    options: &SpecialOptionsConfig,
) {
    let constraints = layout.constraints();
    let styles = layout.styles();
    let block = line.block;
    let style = styles.get(block.kind);
    let LineLayout { byte_range, width } = &line.extent.lines[line.line_idx];

    let first_line = line.line_idx == 0;
    let available = style.line_width(constraints.content_width(), first_line);
    let mut x = constraints.margin_left + style.left_indent;
    if first_line {
        x += style.first_line_indent;
    }
    match style.alignment {
        Alignment::Justify => {}
        Alignment::Center => x += ((available - width) / 2.0).max(0.0),
        Alignment::Right => x += (available - width).max(0.0),
    }

    // Lead sentence gets the heading face (or bold), the rest plain body text
    let emphasis = match block.kind {
        BlockKind::Heading1 | BlockKind::Heading2 => Some(style.clone()),
        BlockKind::Paragraph if options.bold_first_sentence => Some(BlockStyle {
            bold: true,
            ..style.clone()
        }),
        _ => None,
    };
    let lead_end = block
        .lead_sentence()
        .map_or(block.text.len(), |(lead, _)| lead.len());

    let mut pieces: Vec<(std::ops::Range<usize>, &BlockStyle)> = Vec::with_capacity(2);
    match &emphasis {
        Some(emphasis) if byte_range.start < lead_end && lead_end < byte_range.end => {
            pieces.push((byte_range.start..lead_end, emphasis));
            pieces.push((lead_end..byte_range.end, styles.body()));
        }
        Some(emphasis) if byte_range.end <= lead_end => {
            pieces.push((byte_range.clone(), emphasis));
        }
        Some(_) => pieces.push((byte_range.clone(), styles.body())),
        None => pieces.push((byte_range.clone(), style)),
    }

    for (run_idx, (range, run_style)) in pieces.into_iter().enumerate() {
        let text = &block.text[range];
        items.push(DisplayItem::TextRun {
            id: DisplayItemId::new(line.block_idx, line.line_idx, run_idx),
            position: Point { x, y: line.y },
            text: text.to_string(),
            block_kind: block.kind,
            style: run_style.into(),
        });
        x += run_style.metrics.text_width(text);
    }
}

fn note_lines(note: &NoteLayout, left: f32, top: f32, width: f32) -> Vec<NoteText> {
    note.lines
        .iter()
        .map(|line| {
            let line_width = line.style.metrics.text_width(&line.text);
            let x = match line.style.alignment {
                Alignment::Justify => left,
                Alignment::Center => left + ((width - line_width) / 2.0).max(0.0),
                Alignment::Right => left + (width - line_width).max(0.0),
            };
            NoteText {
                position: Point {
                    x,
                    y: top + line.top,
                },
                text: line.text.clone(),
                style: (&line.style).into(),
            }
        })
        .collect()
}

fn header_item(header: &NoteLayout, layout: &LayoutState, constraints: &LayoutConstraints) -> DisplayItem {
    let rect = Rect::new(
        constraints.margin_left,
        constraints.margin_top,
        constraints.content_width(),
        header.height,
    );
    DisplayItem::Header {
        lines: note_lines(header, rect.x, rect.y, rect.width),
        rule_y: rect.y + header.height - layout.styles().body().line_height / 2.0,
        rect,
    }
}

fn footer_item(footer: &NoteLayout, constraints: &LayoutConstraints) -> DisplayItem {
    let rect = Rect::new(
        constraints.margin_left,
        constraints.page_height - constraints.margin_bottom - footer.height,
        constraints.content_width(),
        footer.height,
    );
    DisplayItem::FooterNote {
        lines: note_lines(footer, rect.x, rect.y, rect.width),
        rect,
    }
}

/// Odd pages on the right, even pages on the left, one character in
fn page_number_item(
    page_number: usize,
    layout: &LayoutState,
    options: &SpecialOptionsConfig,
    constraints: &LayoutConstraints,
) -> DisplayItem {
    let font_size = layout.styles().body().metrics.font_size;
    let y = constraints.page_height - constraints.margin_bottom + font_size;
    let (x, alignment) = if page_number % 2 == 1 {
        (
            constraints.page_width - constraints.margin_right - font_size,
            Alignment::Right,
        )
    } else {
        (constraints.margin_left + font_size, Alignment::Justify)
    };

    DisplayItem::PageNumber {
        position: Point { x, y },
        text: format!("— {} —", page_number),
        alignment,
        font_family: options.page_number_font.clone(),
    }
}
