//! Render output: per-page display list

mod display;

pub use display::{
    DisplayItem, DisplayItemId, DisplayList, DisplayPage, NoteText, RunStyle, PLACEHOLDER_TEXT,
};
