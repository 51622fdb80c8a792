//! Flat buffer protocol for zero-copy WASM bridge
//!
//! Binary format for render data:
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header:
//! [0]     MAGIC (0x4757504C = "GWPL" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     page_count
//! [3]     run_count (all pages)
//! [4]     text_buffer_len
//! [5..]   page data...
//!
//! Per-page:
//!   page_index
//!   run_count
//!   per-run: [text_offset, text_len, text_utf16_offset, text_utf16_len, block_kind, flags]
//!     text_offset/text_len: byte offsets in text_data (UTF-8)
//!     text_utf16_offset/text_utf16_len: offsets for JS substring (after single decode)
//!     flags: bit0=bold, bit1=is_heading, bits2-4=heading_level
//! ```
//!
//! ## f32 Buffer Layout:
//! ```text
//! Per-page: [slice_offset, slice_height, clip_y]
//! Per-run:  [x, y, font_size, letter_spacing]
//! ```

use crate::document::BlockKind;
use crate::layout::PageSlice;
use crate::render::{DisplayItem, DisplayList};

/// Magic number for format validation: "GWPL" (GongWen PreviewLayout)
pub const MAGIC: u32 = 0x4757504C;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 5;

/// Opcodes for block kinds
pub const BLOCK_TITLE: u32 = 0;
pub const BLOCK_HEADING_1: u32 = 1;
pub const BLOCK_HEADING_2: u32 = 2;
pub const BLOCK_HEADING_3: u32 = 3;
pub const BLOCK_HEADING_4: u32 = 4;
pub const BLOCK_PARAGRAPH: u32 = 5;
pub const BLOCK_ADDRESSEE: u32 = 6;
pub const BLOCK_ATTACHMENT: u32 = 7;
pub const BLOCK_DATE: u32 = 8;

/// Flags bitmask
pub const FLAG_BOLD: u32 = 0b0001;
pub const FLAG_IS_HEADING: u32 = 0b0010;

/// Number of u32 values per run
pub const U32_PER_RUN: usize = 6;

/// Number of f32 values per page
pub const F32_PER_PAGE: usize = 3;

/// Number of f32 values per run
pub const F32_PER_RUN: usize = 4;

/// Render buffer for zero-copy WASM transfer
#[derive(Debug, Default)]
pub struct RenderBuffer {
    /// Integer data (indices, counts, offsets, opcodes)
    pub u32_data: Vec<u32>,
    /// Float data (positions, dimensions)
    pub f32_data: Vec<f32>,
    /// UTF-8 text buffer
    pub text_data: Vec<u8>,

    // Track cumulative UTF-16 offset for efficient JS decoding
    utf16_text_offset: usize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
        self.utf16_text_offset = 0;
    }

    /// Rebuild the buffer from a display list.
    ///
    /// JS holds pointers into these vectors, so capacity is reserved up front
    /// and pointers must be re-read after every call.
    pub fn write_display_list(&mut self, list: &DisplayList) {
        let run_count = list.text_runs().count();
        let text_needed: usize = list
            .text_runs()
            .map(|item| match item {
                DisplayItem::TextRun { text, .. } => text.len(),
                _ => 0,
            })
            .sum();

        self.clear();
        self.u32_data
            .reserve(HEADER_SIZE + list.pages.len() * 2 + run_count * U32_PER_RUN);
        self.f32_data
            .reserve(list.pages.len() * F32_PER_PAGE + run_count * F32_PER_RUN);
        self.text_data.reserve(text_needed);

        self.write_header(list.pages.len() as u32, run_count as u32);

        for page in &list.pages {
            let count_idx = self.begin_page(page.page_index, &page.slice, page.clip.y);
            let mut runs = 0;
            for item in &page.items {
                if let DisplayItem::TextRun {
                    position,
                    text,
                    block_kind,
                    style,
                    ..
                } = item
                {
                    let (opcode, mut flags) = block_kind_to_opcode(*block_kind);
                    if style.bold {
                        flags |= FLAG_BOLD;
                    }
                    self.write_run(
                        text,
                        opcode,
                        flags,
                        [position.x, position.y, style.font_size, style.letter_spacing],
                    );
                    runs += 1;
                }
            }
            self.u32_data[count_idx] = runs;
        }

        self.finalize();
    }

    fn write_header(&mut self, page_count: u32, run_count: u32) {
        self.u32_data.push(MAGIC); // [0] magic number
        self.u32_data.push(SCHEMA_VERSION); // [1] schema version
        self.u32_data.push(page_count); // [2] page_count
        self.u32_data.push(run_count); // [3] run_count
        self.u32_data.push(0); // [4] text_buffer_len (placeholder)
    }

    /// Write page header, returns index where run_count should be written
    fn begin_page(&mut self, page_index: usize, slice: &PageSlice, clip_y: f32) -> usize {
        self.u32_data.push(page_index as u32);
        let count_idx = self.u32_data.len();
        self.u32_data.push(0);

        self.f32_data.push(slice.offset);
        self.f32_data.push(slice.height);
        self.f32_data.push(clip_y);

        count_idx
    }

    fn write_run(&mut self, text: &str, opcode: u32, flags: u32, geometry: [f32; F32_PER_RUN]) {
        let text_offset = self.text_data.len() as u32;
        self.text_data.extend_from_slice(text.as_bytes());

        let text_utf16_offset = self.utf16_text_offset as u32;
        let text_utf16_len = text.encode_utf16().count() as u32;
        self.utf16_text_offset += text_utf16_len as usize;

        self.u32_data.extend_from_slice(&[
            text_offset,
            text.len() as u32,
            text_utf16_offset,
            text_utf16_len,
            opcode,
            flags,
        ]);
        self.f32_data.extend_from_slice(&geometry);
    }

    fn finalize(&mut self) {
        if self.u32_data.len() >= HEADER_SIZE {
            self.u32_data[4] = self.text_data.len() as u32;
        }
    }

    // Accessors for WASM
    // Return u32 instead of usize for explicit WASM contract (wasm32 linear memory uses u32 offsets)

    pub fn u32_ptr(&self) -> u32 {
        self.u32_data.as_ptr() as u32
    }

    pub fn u32_len(&self) -> u32 {
        self.u32_data.len() as u32
    }

    pub fn f32_ptr(&self) -> u32 {
        self.f32_data.as_ptr() as u32
    }

    pub fn f32_len(&self) -> u32 {
        self.f32_data.len() as u32
    }

    pub fn text_ptr(&self) -> u32 {
        self.text_data.as_ptr() as u32
    }

    pub fn text_len(&self) -> u32 {
        self.text_data.len() as u32
    }
}

/// Flatten page slices into `[offset, height]` pairs
pub fn slice_pairs(slices: &[PageSlice]) -> Vec<f32> {
    slices
        .iter()
        .flat_map(|slice| [slice.offset, slice.height])
        .collect()
}

/// Convert BlockKind to block kind opcode and flags
pub fn block_kind_to_opcode(kind: BlockKind) -> (u32, u32) {
    let opcode = match kind {
        BlockKind::Title => BLOCK_TITLE,
        BlockKind::Heading1 => BLOCK_HEADING_1,
        BlockKind::Heading2 => BLOCK_HEADING_2,
        BlockKind::Heading3 => BLOCK_HEADING_3,
        BlockKind::Heading4 => BLOCK_HEADING_4,
        BlockKind::Paragraph => BLOCK_PARAGRAPH,
        BlockKind::Addressee => BLOCK_ADDRESSEE,
        BlockKind::Attachment => BLOCK_ATTACHMENT,
        BlockKind::Date => BLOCK_DATE,
    };
    let flags = match kind.heading_level() {
        Some(level) => FLAG_IS_HEADING | ((level as u32) << 2),
        None => 0,
    };
    (opcode, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentConfig;
    use crate::document::Document;
    use crate::layout::LayoutState;

    fn display_list(text: &str) -> DisplayList {
        let config = DocumentConfig::default();
        let document = Document::from_text(text);
        let mut layout = LayoutState::new(&config);
        layout.relayout(&document);
        DisplayList::build(&document, &layout, &config.special_options)
    }

    #[test]
    fn test_render_buffer_basic() {
        let mut buf = RenderBuffer::new();
        buf.write_display_list(&display_list("通知\n正文。"));

        assert_eq!(buf.u32_data[0], MAGIC);
        assert_eq!(buf.u32_data[1], SCHEMA_VERSION);
        assert_eq!(buf.u32_data[2], 1); // page_count
        assert_eq!(buf.u32_data[3], 2); // run_count
        assert_eq!(buf.u32_data[4] as usize, "通知正文。".len());
        assert_eq!(buf.text_data, "通知正文。".as_bytes());

        // page 0 with two runs
        assert_eq!(buf.u32_data[HEADER_SIZE], 0);
        assert_eq!(buf.u32_data[HEADER_SIZE + 1], 2);
        assert_eq!(buf.u32_data.len(), HEADER_SIZE + 2 + 2 * U32_PER_RUN);
        assert_eq!(buf.f32_data.len(), F32_PER_PAGE + 2 * F32_PER_RUN);
    }

    #[test]
    fn test_utf16_offsets() {
        let mut buf = RenderBuffer::new();
        buf.write_display_list(&display_list("通知\n正文。"));

        let second_run = HEADER_SIZE + 2 + U32_PER_RUN;
        assert_eq!(buf.u32_data[second_run], 6); // after "通知" in UTF-8
        assert_eq!(buf.u32_data[second_run + 2], 2); // after "通知" in UTF-16
        assert_eq!(buf.u32_data[second_run + 3], 3);
        assert_eq!(buf.u32_data[second_run + 4], BLOCK_PARAGRAPH);
    }

    #[test]
    fn test_rewrite_resets_buffer() {
        let mut buf = RenderBuffer::new();
        buf.write_display_list(&display_list("通知\n正文。"));
        buf.write_display_list(&display_list("通知"));
        assert_eq!(buf.u32_data[3], 1);
        assert_eq!(buf.text_data, "通知".as_bytes());
    }

    #[test]
    fn test_heading_flags() {
        assert_eq!(block_kind_to_opcode(BlockKind::Paragraph), (BLOCK_PARAGRAPH, 0));
        assert_eq!(
            block_kind_to_opcode(BlockKind::Heading3),
            (BLOCK_HEADING_3, FLAG_IS_HEADING | (3 << 2))
        );
    }

    #[test]
    fn test_slice_pairs() {
        let slices = [PageSlice::new(0.0, 609.0), PageSlice::new(609.0, 58.0)];
        assert_eq!(slice_pairs(&slices), vec![0.0, 609.0, 609.0, 58.0]);
        assert!(slice_pairs(&[]).is_empty());
    }
}
