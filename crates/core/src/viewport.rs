//! Fixed-row windowing.
//!
//! Only rows inside the range returned by [`visible_range`] may be materialized;
//! that is what keeps render cost independent of the list length.

use std::ops::Range;

use serde::Serialize;

use crate::CoreError;

/// Scroll geometry supplied by the hosting surface on every scroll/resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    scroll_offset: f64,
    viewport_height: f64,
    row_height: f64,
    overscan: usize,
}

impl Viewport {
    /// Validates and builds a viewport.
    ///
    /// A negative scroll offset (elastic overscroll) is clamped to zero.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidViewport`] if a height is not a positive
    /// finite number or the scroll offset is NaN/infinite.
    pub fn new(
        scroll_offset: f64,
        viewport_height: f64,
        row_height: f64,
        overscan: usize,
    ) -> Result<Self, CoreError> {
        if !scroll_offset.is_finite() {
            return Err(CoreError::InvalidViewport(format!(
                "scroll offset must be finite, got {scroll_offset}"
            )));
        }
        if !(viewport_height.is_finite() && viewport_height > 0.0) {
            return Err(CoreError::InvalidViewport(format!(
                "viewport height must be > 0, got {viewport_height}"
            )));
        }
        if !(row_height.is_finite() && row_height > 0.0) {
            return Err(CoreError::InvalidViewport(format!(
                "row height must be > 0, got {row_height}"
            )));
        }
        Ok(Self { scroll_offset: scroll_offset.max(0.0), viewport_height, row_height, overscan })
    }

    /// Same geometry scrolled to `scroll_offset`.
    #[must_use]
    pub fn scrolled_to(self, scroll_offset: f64) -> Self {
        let offset = if scroll_offset.is_finite() { scroll_offset.max(0.0) } else { 0.0 };
        Self { scroll_offset: offset, ..self }
    }

    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    #[must_use]
    pub const fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    #[must_use]
    pub const fn row_height(&self) -> f64 {
        self.row_height
    }

    #[must_use]
    pub const fn overscan(&self) -> usize {
        self.overscan
    }
}

/// Inclusive index range of rows to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VisibleRange {
    /// Nothing to render; the caller shows its empty-state message.
    Empty,
    Rows { start: usize, end: usize },
}

impl VisibleRange {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[must_use]
    pub const fn start(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Rows { start, .. } => Some(*start),
        }
    }

    /// Last index to render (inclusive).
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Rows { end, .. } => Some(*end),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Rows { start, end } => end.saturating_sub(*start).saturating_add(1),
        }
    }

    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        match self {
            Self::Empty => false,
            Self::Rows { start, end } => index >= *start && index <= *end,
        }
    }

    /// Half-open form, convenient for slicing.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        match self {
            Self::Empty => 0..0,
            Self::Rows { start, end } => *start..end.saturating_add(1),
        }
    }
}

/// Computes which rows must be rendered for `viewport` over `item_count` rows.
///
/// `start = floor(offset / row_height) - overscan` (floored at zero) and
/// `ceil(height / row_height) + 2 * overscan` rows are taken from there,
/// clipped to the list. O(1) and free of hidden state.
#[must_use]
pub fn visible_range(viewport: &Viewport, item_count: usize) -> VisibleRange {
    let Some(last_index) = item_count.checked_sub(1) else {
        return VisibleRange::Empty;
    };

    // Float-to-int casts saturate, so absurd offsets land on `last_index` below.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "inputs validated non-negative")]
    let first_in_view = (viewport.scroll_offset / viewport.row_height).floor() as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "inputs validated positive")]
    let rows_in_view = (viewport.viewport_height / viewport.row_height).ceil() as usize;

    // Scrolled past the end of a list that shrank: pin to the last row.
    let start = first_in_view.saturating_sub(viewport.overscan).min(last_index);
    let visible_count =
        rows_in_view.max(1).saturating_add(viewport.overscan.saturating_mul(2));
    let end = start.saturating_add(visible_count - 1).min(last_index);

    VisibleRange::Rows { start, end }
}

/// Render geometry for a windowed list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Window {
    pub range: VisibleRange,
    /// Offset of the first rendered row from the top of the scroll content.
    pub offset_top: f64,
    /// Height of the full (mostly unrendered) scroll content.
    pub total_height: f64,
}

/// [`visible_range`] plus the spacer geometry the host needs to position rows.
#[must_use]
pub fn window(viewport: &Viewport, item_count: usize) -> Window {
    let range = visible_range(viewport, item_count);
    let offset_top = range.start().map_or(0.0, |start| row_offset(start, viewport.row_height));
    Window { range, offset_top, total_height: row_offset(item_count, viewport.row_height) }
}

/// Scroll offset that brings row `index` to the top of the viewport.
#[must_use]
pub fn scroll_offset_for(index: usize, row_height: f64) -> f64 {
    row_offset(index, row_height)
}

#[allow(clippy::cast_precision_loss, reason = "row counts far below 2^52")]
fn row_offset(rows: usize, row_height: f64) -> f64 {
    rows as f64 * row_height
}
