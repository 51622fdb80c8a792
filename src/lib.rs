//! Gongwen preview: official-document typesetting core
//!
//! This crate turns plain text into a paginated preview of a Chinese
//! official document (公文) laid out per GB/T 9704:
//! - Block classification (title, addressee, numbered headings, attachment, date)
//! - Line measurement on a fixed character grid
//! - Pagination with a first-page header and a last-page footer note
//! - Display lists for rendering, plus a WASM bridge for the browser

pub mod config;
pub mod document;
pub mod error;
pub mod import;
pub mod layout;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPreviewer;

// Re-export primary types
pub use config::DocumentConfig;
pub use document::{classify, Block, BlockKind, Document};
pub use error::{Error, Result};
pub use layout::{paginate, Flow, LayoutConstraints, LayoutState, LineSpan, PageGeometry, PageSlice};
pub use render::{DisplayItem, DisplayItemId, DisplayList, DisplayPage};

use serde::Serialize;

/// Page coordinates in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Page rectangle in points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// The main previewer state combining all components.
///
/// Every text or configuration change reclassifies, re-measures and
/// re-paginates the whole document before returning, so the document, flow
/// and pages always describe the same text.
pub struct Previewer {
    text: String,
    config: DocumentConfig,
    document: Document,
    layout: LayoutState,
}

impl Default for Previewer {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

impl Previewer {
    /// Create a new previewer with the given configuration
    pub fn new(config: DocumentConfig) -> Self {
        let document = Document::default();
        let mut layout = LayoutState::new(&config);
        layout.relayout(&document);
        Self {
            text: String::new(),
            config,
            document,
            layout,
        }
    }

    /// Create previewer with initial text
    pub fn with_text(text: &str, config: DocumentConfig) -> Self {
        let mut previewer = Self::new(config);
        previewer.set_text(text);
        previewer
    }

    /// Replace the source text
    pub fn set_text(&mut self, text: &str) {
        if self.text != text {
            self.text = text.to_string();
            self.document = classify(&self.text);
            self.layout.relayout(&self.document);
        }
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: DocumentConfig) {
        if self.config != config {
            self.layout = LayoutState::new(&config);
            self.layout.relayout(&self.document);
            self.config = config;
        }
    }

    /// Deep-merge a JSON patch into the configuration
    pub fn patch_config(&mut self, json: &str) -> Result<()> {
        let mut config = self.config.clone();
        config.apply_patch(json)?;
        self.set_config(config);
        Ok(())
    }

    /// Current page slices; layout is already up to date after every change
    pub fn update_layout(&mut self) -> &[PageSlice] {
        self.layout.pages()
    }

    /// Build display list for all pages
    pub fn build_display_list(&self) -> DisplayList {
        DisplayList::build(&self.document, &self.layout, &self.config.special_options)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn flow(&self) -> &Flow {
        self.layout.flow()
    }

    pub fn pages(&self) -> &[PageSlice] {
        self.layout.pages()
    }

    /// Get page count
    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }
}
