//! WASM bindings for the previewer

mod flat_buffer;

pub use flat_buffer::{block_kind_to_opcode, slice_pairs, RenderBuffer};

use crate::layout::{paginate, LineSpan, PageGeometry};
use crate::{DocumentConfig, Previewer};
use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed previewer wrapper
#[wasm_bindgen]
pub struct WasmPreviewer {
    previewer: Previewer,
    buffer: RenderBuffer,
}

#[wasm_bindgen]
impl WasmPreviewer {
    /// Create a previewer with the GB/T 9704 defaults
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            previewer: Previewer::default(),
            buffer: RenderBuffer::new(),
        }
    }

    /// Replace the source text
    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, text: &str) {
        self.previewer.set_text(text);
    }

    /// Deep-merge a partial JSON configuration
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, json: &str) -> Result<(), JsValue> {
        self.previewer
            .patch_config(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Reset the configuration to the defaults
    #[wasm_bindgen(js_name = resetConfig)]
    pub fn reset_config(&mut self) {
        self.previewer.set_config(DocumentConfig::default());
    }

    /// Current configuration as JSON
    #[wasm_bindgen(js_name = getConfigJson)]
    pub fn get_config_json(&self) -> Result<String, JsValue> {
        self.previewer
            .config()
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Page count of the current layout
    #[wasm_bindgen(js_name = updateLayout)]
    pub fn update_layout(&mut self) -> usize {
        self.previewer.update_layout().len()
    }

    /// Get page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.previewer.page_count()
    }

    /// Classified document as JSON
    #[wasm_bindgen(js_name = getDocumentJson)]
    pub fn get_document_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.previewer.document())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Display list of every page as JSON
    #[wasm_bindgen(js_name = getRenderData)]
    pub fn get_render_data(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.previewer.build_display_list())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Page slices as `[offset, height, offset, height, ...]`
    #[wasm_bindgen(js_name = getSliceBuffer)]
    pub fn get_slice_buffer(&self) -> Float32Array {
        Float32Array::from(slice_pairs(self.previewer.pages()).as_slice())
    }

    /// Fill the flat render buffer; read it through the pointer accessors
    #[wasm_bindgen(js_name = buildRenderBuffer)]
    pub fn build_render_buffer(&mut self) {
        let list = self.previewer.build_display_list();
        self.buffer.write_display_list(&list);
    }

    #[wasm_bindgen(js_name = u32Ptr)]
    pub fn u32_ptr(&self) -> u32 {
        self.buffer.u32_ptr()
    }

    #[wasm_bindgen(js_name = u32Len)]
    pub fn u32_len(&self) -> u32 {
        self.buffer.u32_len()
    }

    #[wasm_bindgen(js_name = f32Ptr)]
    pub fn f32_ptr(&self) -> u32 {
        self.buffer.f32_ptr()
    }

    #[wasm_bindgen(js_name = f32Len)]
    pub fn f32_len(&self) -> u32 {
        self.buffer.f32_len()
    }

    #[wasm_bindgen(js_name = textPtr)]
    pub fn text_ptr(&self) -> u32 {
        self.buffer.text_ptr()
    }

    #[wasm_bindgen(js_name = textLen)]
    pub fn text_len(&self) -> u32 {
        self.buffer.text_len()
    }
}

impl Default for WasmPreviewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Paginate spans measured on the JS side.
///
/// `tops` and `bottoms` are parallel arrays; extra entries of the longer one
/// are ignored. Returns `[offset, height]` pairs.
#[wasm_bindgen(js_name = paginateSpans)]
pub fn paginate_spans(
    tops: &[f32],
    bottoms: &[f32],
    full_height: f32,
    header_height: f32,
    footer_height: f32,
) -> Float32Array {
    let spans: Vec<LineSpan> = tops
        .iter()
        .zip(bottoms)
        .map(|(&top, &bottom)| LineSpan::new(top, bottom))
        .collect();
    let geometry = PageGeometry::new(full_height)
        .with_header(header_height)
        .with_footer(footer_height);

    Float32Array::from(slice_pairs(&paginate(&spans, &geometry)).as_slice())
}
