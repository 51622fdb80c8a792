//! Text measurement and pagination

mod engine;
pub mod font;
mod line_break;
mod pagination;

pub use engine::{
    measure_flow, BlockExtent, BlockLayout, Flow, LayoutConstraints, LayoutState, LineLayout,
    LineMetrics, NoteLayout, NoteLine, TextMeasurer,
};
pub use font::{Alignment, BlockStyle, FontMetrics, StyleSheet};
pub use line_break::LineBreaker;
pub use pagination::{
    paginate, LineSpan, PageGeometry, PageSlice, EPSILON, MAX_FIXUP_ITERATIONS,
};
