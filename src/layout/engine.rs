//! Measurement of a document into a continuous content flow

use crate::config::{
    cm_to_pt, DocumentConfig, FooterNoteConfig, HeaderConfig, A4_HEIGHT_PT, A4_WIDTH_PT,
};
use crate::document::{Block, BlockKind, Document};
use crate::layout::font::{Alignment, BlockStyle, StyleSheet};
use crate::layout::line_break::LineBreaker;
use crate::layout::pagination::{paginate, LineSpan, PageGeometry, PageSlice};
use std::ops::Range;

/// Layout constraints for the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraints {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self::from_config(&DocumentConfig::default())
    }
}

impl LayoutConstraints {
    /// A4 page with the configured margins
    pub fn from_config(config: &DocumentConfig) -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin_top: cm_to_pt(config.margins.top),
            margin_bottom: cm_to_pt(config.margins.bottom),
            margin_left: cm_to_pt(config.margins.left),
            margin_right: cm_to_pt(config.margins.right),
        }
    }

    /// Get usable content width
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Get usable content height per page
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

/// Layout result for a single line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Byte range within the block text this line covers
    pub byte_range: Range<usize>,
    /// Actual width of content
    pub width: f32,
}

/// Layout result for a block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    /// Lines produced by line breaking; never empty
    pub lines: Vec<LineLayout>,
    pub line_height: f32,
    /// Space above the first line
    pub space_before: f32,
    /// Total height including spacing
    pub total_height: f32,
}

impl BlockLayout {
    pub fn new(lines: Vec<LineLayout>, line_height: f32, space_before: f32) -> Self {
        let total_height = lines.len() as f32 * line_height + space_before;
        Self {
            lines,
            line_height,
            space_before,
            total_height,
        }
    }

    /// Get total line count
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Source of line geometry for pagination.
///
/// The pagination planner only ever sees the spans built from these
/// layouts, so any measurer (a browser, a font rasterizer, a fixed grid in
/// tests) can stand behind this trait.
pub trait LineMetrics {
    /// Break one block into lines at the given content width
    fn measure_block(&self, block: &Block, content_width: f32) -> BlockLayout;
}

/// Built-in measurer: fixed line pitch on a CJK character grid
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    styles: StyleSheet,
    breaker: LineBreaker,
}

impl TextMeasurer {
    pub fn new(config: &DocumentConfig, constraints: &LayoutConstraints) -> Self {
        Self {
            styles: StyleSheet::from_config(config, constraints.content_width()),
            breaker: LineBreaker::new(),
        }
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Lay out the issuing-organ header of the first page.
    ///
    /// Organ name in the title face, then the document number, then one
    /// body line for the red rule under them.
    pub fn layout_header(&self, header: &HeaderConfig, content_width: f32) -> NoteLayout {
        if !header.is_visible() {
            return NoteLayout::default();
        }

        let body = self.styles.body();
        let mut note = NoteLayout::default();
        let organ_style = note_style(self.styles.get(BlockKind::Title), Alignment::Center);
        let number_style = note_style(body, Alignment::Center);

        self.push_note_text(&mut note, header.organ.trim(), &organ_style, content_width);
        self.push_note_text(&mut note, header.document_number.trim(), &number_style, content_width);
        note.height += body.line_height;
        note
    }

    /// Lay out the copy-to and printing note of the last page.
    ///
    /// A half-character rule gap, then the copy-to line, then the printing
    /// organ and date on one line.
    pub fn layout_footer_note(&self, footer: &FooterNoteConfig, content_width: f32) -> NoteLayout {
        if !footer.is_visible() {
            return NoteLayout::default();
        }

        let body = self.styles.body();
        let style = note_style(body, Alignment::Justify);
        let mut note = NoteLayout {
            lines: Vec::new(),
            height: body.metrics.font_size / 2.0,
        };

        let copy_to = footer.copy_to.trim();
        if !copy_to.is_empty() {
            self.push_note_text(&mut note, &format!("抄送：{}", copy_to), &style, content_width);
        }

        let printing = [footer.printer.trim(), footer.print_date.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("    ");
        self.push_note_text(&mut note, &printing, &style, content_width);

        note
    }

    fn push_note_text(&self, note: &mut NoteLayout, text: &str, style: &BlockStyle, width: f32) {
        if text.is_empty() {
            return;
        }
        let block = Block::new(BlockKind::Paragraph, text, 0);
        let layout = self.breaker.layout_block(&block, style, width);
        for line in &layout.lines {
            note.lines.push(NoteLine {
                text: text[line.byte_range.clone()].to_string(),
                top: note.height,
                style: style.clone(),
            });
            note.height += layout.line_height;
        }
    }
}

impl LineMetrics for TextMeasurer {
    fn measure_block(&self, block: &Block, content_width: f32) -> BlockLayout {
        self.breaker
            .layout_block(block, self.styles.get(block.kind), content_width)
    }
}

fn note_style(base: &BlockStyle, alignment: Alignment) -> BlockStyle {
    BlockStyle {
        alignment,
        first_line_indent: 0.0,
        left_indent: 0.0,
        right_indent: 0.0,
        space_before: 0.0,
        ..base.clone()
    }
}

/// One line of a header or footer note
#[derive(Debug, Clone, PartialEq)]
pub struct NoteLine {
    pub text: String,
    /// Offset from the top of the note
    pub top: f32,
    pub style: BlockStyle,
}

/// Laid-out header or footer note with its reserved height
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteLayout {
    pub lines: Vec<NoteLine>,
    /// Space reserved on the page; 0 when the note is hidden
    pub height: f32,
}

impl NoteLayout {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Vertical extent of one block in the flow
#[derive(Debug, Clone, PartialEq)]
pub struct BlockExtent {
    pub top: f32,
    pub bottom: f32,
    /// Index of the block's first span in [`Flow::spans`]
    pub first_span: usize,
    pub span_count: usize,
    /// Visual lines, one per span
    pub lines: Vec<LineLayout>,
}

impl BlockExtent {
    /// Range of span indices belonging to this block
    pub fn span_range(&self) -> Range<usize> {
        self.first_span..self.first_span + self.span_count
    }
}

/// Measured content of a whole document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    /// Every visual line, in order
    pub spans: Vec<LineSpan>,
    /// One extent per block, in [`Document::blocks`] order
    pub blocks: Vec<BlockExtent>,
}

impl Flow {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total flow height
    pub fn total_height(&self) -> f32 {
        self.spans.last().map_or(0.0, |span| span.bottom)
    }
}

/// Stack every block of a document into one flow.
///
/// A block's spacing-before belongs to its first span, so spans tile the flow
/// without gaps and the last bottom equals the total height.
pub fn measure_flow(document: &Document, metrics: &impl LineMetrics, content_width: f32) -> Flow {
    let mut flow = Flow::default();
    let mut y: f32 = 0.0;

    for block in document.blocks() {
        let layout = metrics.measure_block(block, content_width);
        let top = y;
        let first_span = flow.spans.len();

        for idx in 0..layout.lines.len() {
            let span_top = if idx == 0 {
                top
            } else {
                top + layout.space_before + idx as f32 * layout.line_height
            };
            let span_bottom = top + layout.space_before + (idx + 1) as f32 * layout.line_height;
            flow.spans.push(LineSpan::new(span_top, span_bottom));
        }

        y = top + layout.total_height;
        flow.blocks.push(BlockExtent {
            top,
            bottom: y,
            first_span,
            span_count: layout.lines.len(),
            lines: layout.lines,
        });
    }

    log::debug!(
        "measured {} blocks into {} lines, {:.1} high",
        flow.blocks.len(),
        flow.spans.len(),
        y
    );

    flow
}

/// Complete layout state of one document under one configuration
#[derive(Debug, Clone)]
pub struct LayoutState {
    constraints: LayoutConstraints,
    measurer: TextMeasurer,
    header: NoteLayout,
    footer_note: NoteLayout,
    flow: Flow,
    pages: Vec<PageSlice>,
}

impl LayoutState {
    /// Create new layout state; header and footer notes are measured once here
    pub fn new(config: &DocumentConfig) -> Self {
        let constraints = LayoutConstraints::from_config(config);
        let measurer = TextMeasurer::new(config, &constraints);
        let width = constraints.content_width();
        let header = measurer.layout_header(&config.header, width);
        let footer_note = measurer.layout_footer_note(&config.footer_note, width);

        Self {
            constraints,
            measurer,
            header,
            footer_note,
            flow: Flow::default(),
            pages: vec![PageSlice::default()],
        }
    }

    /// Measure and paginate a document from scratch
    pub fn relayout(&mut self, document: &Document) -> &[PageSlice] {
        self.flow = measure_flow(document, &self.measurer, self.constraints.content_width());
        self.pages = paginate(&self.flow.spans, &self.geometry());
        &self.pages
    }

    /// Page geometry for the current configuration
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.constraints.content_height())
            .with_header(self.header.height)
            .with_footer(self.footer_note.height)
    }

    pub fn constraints(&self) -> &LayoutConstraints {
        &self.constraints
    }

    pub fn styles(&self) -> &StyleSheet {
        self.measurer.styles()
    }

    pub fn header(&self) -> &NoteLayout {
        &self.header
    }

    pub fn footer_note(&self) -> &NoteLayout {
        &self.footer_note
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn pages(&self) -> &[PageSlice] {
        &self.pages
    }

    /// Get page count
    pub fn page_count(&self) -> usize {
        self.pages.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every block is `text.chars().count()` lines of 10
    struct FixedMetrics;

    impl LineMetrics for FixedMetrics {
        fn measure_block(&self, block: &Block, _content_width: f32) -> BlockLayout {
            let lines = (0..block.text.chars().count())
                .map(|_| LineLayout {
                    byte_range: 0..block.text.len(),
                    width: 0.0,
                })
                .collect();
            let space_before = if block.kind == BlockKind::Addressee {
                5.0
            } else {
                0.0
            };
            BlockLayout::new(lines, 10.0, space_before)
        }
    }

    fn default_state() -> LayoutState {
        LayoutState::new(&DocumentConfig::default())
    }

    #[test]
    fn test_layout_constraints() {
        let constraints = LayoutConstraints::default();
        assert!((constraints.content_width() - 442.19).abs() < 0.01);
        assert!((constraints.content_height() - 637.80).abs() < 0.01);
    }

    #[test]
    fn test_block_layout_height() {
        let layout = BlockLayout::new(
            vec![
                LineLayout {
                    byte_range: 0..3,
                    width: 16.0,
                },
                LineLayout {
                    byte_range: 3..6,
                    width: 16.0,
                },
            ],
            29.0,
            29.0,
        );
        assert_eq!(layout.line_count(), 2);
        assert_eq!(layout.total_height, 87.0);
    }

    #[test]
    fn test_measure_flow_stacks_blocks() {
        let document = Document::from_text("题\n各单位：\n正文三行");
        let flow = measure_flow(&document, &FixedMetrics, 100.0);

        assert_eq!(flow.blocks.len(), 3);
        assert_eq!(flow.spans.len(), 1 + 4 + 4);

        // Addressee spacing goes into its first span
        let addressee = &flow.blocks[1];
        assert_eq!(addressee.top, 10.0);
        assert_eq!(flow.spans[addressee.first_span], LineSpan::new(10.0, 25.0));
        assert_eq!(flow.spans[addressee.first_span + 1], LineSpan::new(25.0, 35.0));
        assert_eq!(addressee.bottom, 55.0);

        assert_eq!(flow.blocks[2].span_range(), 5..9);
        assert_eq!(flow.total_height(), 95.0);
    }

    #[test]
    fn test_spans_tile_the_flow() {
        let document = Document::from_text("关于做好安全生产工作的通知\n各单位：\n一、总体要求\n正文。");
        let state = {
            let mut state = default_state();
            state.relayout(&document);
            state
        };
        let spans = &state.flow().spans;
        assert_eq!(spans[0].top, 0.0);
        for pair in spans.windows(2) {
            assert_eq!(pair[0].bottom, pair[1].top);
        }
    }

    #[test]
    fn test_empty_document_flow() {
        let flow = measure_flow(&Document::default(), &FixedMetrics, 100.0);
        assert!(flow.is_empty());
        assert_eq!(flow.total_height(), 0.0);
    }

    #[test]
    fn test_default_page_holds_21_body_lines() {
        let text: String = std::iter::once("标题".to_string())
            .chain((0..60).map(|i| format!("第{}段。", i)))
            .collect::<Vec<_>>()
            .join("\n");
        let document = Document::from_text(&text);

        let mut state = default_state();
        let pages = state.relayout(&document).to_vec();
        assert_eq!(pages[0].offset, 0.0);
        assert_eq!(pages[1].offset, 21.0 * 29.0);
        assert_eq!(pages[1].height, 21.0 * 29.0);
    }

    #[test]
    fn test_long_paragraph_wraps_on_grid() {
        // 26 characters after the two-character indent, then 28 per line
        let text: String = std::iter::repeat('安').take(26 + 28 + 1).collect();
        let document = Document::from_text(&format!("标题\n{}", text));
        let constraints = LayoutConstraints::default();
        let measurer = TextMeasurer::new(&DocumentConfig::default(), &constraints);
        let flow = measure_flow(&document, &measurer, constraints.content_width());

        let paragraph = &flow.blocks[1];
        assert_eq!(paragraph.span_count, 3);
        assert_eq!(paragraph.lines[0].byte_range, 0..26 * 3);
        assert_eq!(paragraph.lines[1].byte_range, 26 * 3..54 * 3);
    }

    #[test]
    fn test_header_reservation() {
        let config = DocumentConfig::from_json(
            r#"{"header": {"enabled": true, "organ": "XX市人民政府文件", "documentNumber": "X政发〔2025〕1号"}}"#,
        )
        .unwrap();
        let state = LayoutState::new(&config);
        let header = state.header();

        assert_eq!(header.lines.len(), 2);
        assert_eq!(header.lines[0].text, "XX市人民政府文件");
        assert_eq!(header.lines[0].style.alignment, Alignment::Center);
        assert_eq!(header.lines[1].top, 29.0);
        assert_eq!(header.height, 87.0);
        assert_eq!(state.geometry().header_height, 87.0);
        assert_eq!(state.geometry().footer_height, 0.0);
    }

    #[test]
    fn test_footer_reservation() {
        let config = DocumentConfig::from_json(
            r#"{"footerNote": {"enabled": true, "copyTo": "市委办公室", "printer": "XX市人民政府办公室", "printDate": "2025年10月21日印发"}}"#,
        )
        .unwrap();
        let state = LayoutState::new(&config);
        let footer = state.footer_note();

        assert_eq!(footer.lines.len(), 2);
        assert_eq!(footer.lines[0].text, "抄送：市委办公室");
        assert_eq!(footer.lines[0].top, 8.0);
        assert_eq!(footer.lines[1].text, "XX市人民政府办公室    2025年10月21日印发");
        assert_eq!(footer.height, 66.0);
    }

    #[test]
    fn test_hidden_notes_reserve_nothing() {
        let config = DocumentConfig::from_json(
            r#"{"header": {"enabled": false, "organ": "XX"}, "footerNote": {"enabled": true}}"#,
        )
        .unwrap();
        let state = LayoutState::new(&config);
        assert!(state.header().is_empty());
        assert_eq!(state.header().height, 0.0);
        assert_eq!(state.footer_note().height, 0.0);
    }

    #[test]
    fn test_relayout_is_repeatable() {
        let document = Document::from_text("标题\n正文。");
        let mut state = default_state();
        let first = state.relayout(&document).to_vec();
        let second = state.relayout(&document).to_vec();
        assert_eq!(first, second);
        assert_eq!(state.page_count(), 1);
    }
}
