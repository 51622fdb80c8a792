//! Line breaking algorithm

use crate::document::Block;
use crate::layout::engine::{BlockLayout, LineLayout};
use crate::layout::font::BlockStyle;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Slack allowed when a line is filled exactly; absorbs f32 accumulation
/// over a full grid line.
const FIT_TOLERANCE: f32 = 0.01;

/// Line breaker
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Layout a block into lines
    pub fn layout_block(&self, block: &Block, style: &BlockStyle, content_width: f32) -> BlockLayout {
        let text = block.text.as_str();
        let metrics = &style.metrics;

        // Byte offsets where a new line may start
        let opportunities: Vec<usize> = linebreaks(text)
            .filter(|(_, op)| *op == BreakOpportunity::Allowed)
            .map(|(idx, _)| idx)
            .collect();
        let mut next_opportunity = 0;

        let mut lines = Vec::new();
        let mut line_start: usize = 0;
        let mut x: f32 = 0.0;
        let mut last_break: Option<(usize, f32)> = None;

        for (byte_idx, grapheme) in text.grapheme_indices(true) {
            while next_opportunity < opportunities.len() && opportunities[next_opportunity] < byte_idx {
                next_opportunity += 1;
            }
            if opportunities.get(next_opportunity) == Some(&byte_idx) && byte_idx > line_start {
                last_break = Some((byte_idx, x));
            }

            let cluster_width: f32 = grapheme.chars().map(|c| metrics.width(c)).sum();
            let max_width = style.line_width(content_width, lines.is_empty());

            // Check for soft wrap
            if x + cluster_width > max_width + FIT_TOLERANCE && byte_idx > line_start {
                // Break at last break point if available, else mid-word
                let (break_offset, break_x) = last_break.unwrap_or((byte_idx, x));

                lines.push(LineLayout {
                    byte_range: line_start..break_offset,
                    width: break_x,
                });

                line_start = break_offset;
                x -= break_x;
                last_break = None;
            }

            x += cluster_width;
        }

        // Final line
        lines.push(LineLayout {
            byte_range: line_start..text.len(),
            width: x,
        });

        BlockLayout::new(lines, style.line_height, style.space_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockKind;
    use crate::layout::font::{Alignment, FontMetrics};

    fn grid_style(font_size: f32) -> BlockStyle {
        BlockStyle {
            font_family: "仿宋_GB2312".to_string(),
            metrics: FontMetrics::new(font_size, 0.0),
            line_height: 20.0,
            bold: false,
            alignment: Alignment::Justify,
            first_line_indent: 0.0,
            left_indent: 0.0,
            right_indent: 0.0,
            space_before: 0.0,
        }
    }

    fn block(text: &str) -> Block {
        Block::new(BlockKind::Paragraph, text, 1)
    }

    #[test]
    fn test_single_line() {
        let layout = LineBreaker::new().layout_block(&block("安全生产"), &grid_style(10.0), 100.0);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].byte_range, 0..12);
        assert_eq!(layout.lines[0].width, 40.0);
        assert_eq!(layout.total_height, 20.0);
    }

    #[test]
    fn test_exact_fill_does_not_wrap() {
        let text: String = std::iter::repeat('安').take(10).collect();
        let layout = LineBreaker::new().layout_block(&block(&text), &grid_style(10.0), 100.0);
        assert_eq!(layout.lines.len(), 1);
    }

    #[test]
    fn test_cjk_wrap() {
        // 25 ideographs on a 10-character grid
        let text: String = std::iter::repeat('安').take(25).collect();
        let layout = LineBreaker::new().layout_block(&block(&text), &grid_style(10.0), 100.0);
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.lines[0].byte_range, 0..30);
        assert_eq!(layout.lines[1].byte_range, 30..60);
        assert_eq!(layout.lines[2].byte_range, 60..75);
        assert_eq!(layout.total_height, 60.0);
    }

    #[test]
    fn test_closing_punctuation_stays_on_line_end() {
        // Ten ideographs fill the line; the comma may not start the next line,
        // so the last ideograph moves down with it.
        let text = "一二三四五六七八九十，好";
        let layout = LineBreaker::new().layout_block(&block(text), &grid_style(10.0), 100.0);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(&text[layout.lines[1].byte_range.clone()], "十，好");
    }

    #[test]
    fn test_latin_breaks_at_spaces() {
        // 5px per half-width char: "hello " is 30px, "world" 25px
        let text = "hello world";
        let layout = LineBreaker::new().layout_block(&block(text), &grid_style(10.0), 40.0);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(&text[layout.lines[0].byte_range.clone()], "hello ");
        assert_eq!(&text[layout.lines[1].byte_range.clone()], "world");
    }

    #[test]
    fn test_first_line_indent() {
        let mut style = grid_style(10.0);
        style.first_line_indent = 20.0;
        let text: String = std::iter::repeat('安').take(18).collect();
        let layout = LineBreaker::new().layout_block(&block(&text), &style, 100.0);
        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.lines[0].byte_range, 0..24);
        assert_eq!(layout.lines[1].byte_range, 24..54);
    }

    #[test]
    fn test_space_before_counts_in_height() {
        let mut style = grid_style(10.0);
        style.space_before = 20.0;
        let layout = LineBreaker::new().layout_block(&block("各单位："), &style, 100.0);
        assert_eq!(layout.total_height, 40.0);
    }
}
