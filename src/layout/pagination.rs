//! Pagination of a measured content flow into page slices
//!
//! The planner only sees line extents. Every page shows a window
//! `[offset, offset + height)` of one continuous flow; windows always start on
//! a line top, so no line is ever cut between pages.
//!
//! Two reservations shrink the window: the header takes space on the first
//! page only, the footer note on the last page only. Because the footer
//! depends on which page ends up last, it is handled by a fix-up pass after
//! the greedy partition: if the last page cannot also hold the footer, a new
//! break is inserted, which makes a new last page, and the check repeats.

use serde::Serialize;
use smallvec::{smallvec, SmallVec};

/// Minimum progress, in flow units, before a break is allowed.
///
/// A line whose top sits within this distance of the page start is never
/// pushed to the next page, so an oversized line cannot loop forever.
/// Tied to sub-pixel measurement noise; tune with the measurement unit.
pub const EPSILON: f32 = 0.5;

/// Upper bound on footer fix-up rounds
pub const MAX_FIXUP_ITERATIONS: usize = 10;

/// Vertical extent of one rendered line in flow coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LineSpan {
    pub top: f32,
    pub bottom: f32,
}

impl LineSpan {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }
}

/// Page content geometry
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    /// Content height of a page with no reservations
    pub full_height: f32,
    /// Reserved on the first page only
    pub header_height: f32,
    /// Reserved on the last page only
    pub footer_height: f32,
}

impl PageGeometry {
    pub fn new(full_height: f32) -> Self {
        Self {
            full_height,
            header_height: 0.0,
            footer_height: 0.0,
        }
    }

    pub fn with_header(mut self, height: f32) -> Self {
        self.header_height = height;
        self
    }

    pub fn with_footer(mut self, height: f32) -> Self {
        self.footer_height = height;
        self
    }

    /// Replace negative or non-finite values with zero
    fn clamped(&self) -> Self {
        fn clamp(value: f32) -> f32 {
            if value.is_finite() {
                value.max(0.0)
            } else {
                0.0
            }
        }
        Self {
            full_height: clamp(self.full_height),
            header_height: clamp(self.header_height),
            footer_height: clamp(self.footer_height),
        }
    }

    /// Content budget of the first page
    pub fn first_page_budget(&self) -> f32 {
        self.full_height - self.header_height
    }

    /// Content budget of page `index`, with the footer taken off if it is last
    pub fn page_budget(&self, index: usize, is_last: bool) -> f32 {
        let base = if index == 0 {
            self.first_page_budget()
        } else {
            self.full_height
        };
        if is_last {
            base - self.footer_height
        } else {
            base
        }
    }
}

/// Window of the flow shown on one page
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PageSlice {
    /// Start of the window in flow coordinates
    pub offset: f32,
    /// Height of flow content shown on the page
    pub height: f32,
}

impl PageSlice {
    pub fn new(offset: f32, height: f32) -> Self {
        Self { offset, height }
    }

    /// End of the window (exclusive)
    pub fn end(&self) -> f32 {
        self.offset + self.height
    }

    /// Check if a flow position falls inside this window
    pub fn contains(&self, y: f32) -> bool {
        y >= self.offset && y < self.end()
    }
}

/// Partition a measured flow into page slices.
///
/// `flow` must be sorted by `top` and cover the whole document in order; the
/// last span's `bottom` is taken as the total flow height. Pure: the same
/// input always gives the same slices.
///
/// A line taller than its page is kept whole and overflows that page. An
/// empty flow yields a single empty page.
pub fn paginate(flow: &[LineSpan], geometry: &PageGeometry) -> Vec<PageSlice> {
    let Some(last_span) = flow.last() else {
        return vec![PageSlice::new(0.0, 0.0)];
    };
    let geometry = geometry.clamped();
    let total_height = last_span.bottom;

    let mut breaks = greedy_breaks(flow, &geometry);
    if geometry.footer_height > 0.0 {
        reserve_footer(flow, &geometry, total_height, &mut breaks);
    }

    let slices: Vec<PageSlice> = breaks
        .iter()
        .enumerate()
        .map(|(i, &offset)| {
            let next = breaks.get(i + 1).copied().unwrap_or(total_height);
            PageSlice::new(offset, next - offset)
        })
        .collect();

    log::debug!(
        "paginated {} lines ({:.1} high) into {} pages",
        flow.len(),
        total_height,
        slices.len()
    );

    slices
}

/// Phase 1: break before the first line that does not fit
fn greedy_breaks(flow: &[LineSpan], geometry: &PageGeometry) -> SmallVec<[f32; 8]> {
    let mut breaks: SmallVec<[f32; 8]> = smallvec![0.0];
    let mut page_start = 0.0;
    let mut budget = geometry.first_page_budget();

    for span in flow {
        if span.bottom - page_start > budget && span.top - page_start > EPSILON {
            page_start = span.top;
            breaks.push(page_start);
            budget = geometry.full_height;
        }
    }

    breaks
}

/// Phase 2: make room for the footer on whichever page is last.
///
/// Each round only scans forward from the last break, so the whole pass stays
/// linear in the number of lines.
fn reserve_footer(
    flow: &[LineSpan],
    geometry: &PageGeometry,
    total_height: f32,
    breaks: &mut SmallVec<[f32; 8]>,
) {
    let mut scan_from = 0;

    for _ in 0..MAX_FIXUP_ITERATIONS {
        let last_index = breaks.len() - 1;
        let last_start = breaks[last_index];
        let budget = geometry.page_budget(last_index, true);

        if total_height - last_start <= budget + EPSILON {
            return;
        }

        scan_from += flow[scan_from..].partition_point(|span| span.top < last_start + EPSILON);
        let overflow = flow[scan_from..].iter().position(|span| {
            span.bottom - last_start > budget && span.top - last_start > EPSILON
        });

        match overflow {
            Some(idx) => {
                scan_from += idx;
                breaks.push(flow[scan_from].top);
            }
            // Only an oversized first line is left; it stays where it is
            None => return,
        }
    }

    log::warn!(
        "footer fix-up stopped after {} rounds (footer {:.1}, page {:.1})",
        MAX_FIXUP_ITERATIONS,
        geometry.footer_height,
        geometry.full_height
    );
}
