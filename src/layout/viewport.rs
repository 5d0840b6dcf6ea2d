//! Viewport state: committed scroll offsets and layout size.

use super::visibility::{
    is_program_visible, is_sidebar_item_visible, VisibilityOverrides, OVERSCAN_MULTIPLIER,
};
use crate::types::Position;

/// Visible area of the guide content.
///
/// Written only by the scroll controller; everything downstream reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_x: f64,
    /// Vertical scroll position in content coordinates
    pub scroll_y: f64,
    /// Layout width in pixels
    pub width: f64,
    /// Layout height in pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::new()
        }
    }

    /// Whether a program block is mounted at the current offsets.
    pub fn is_program_visible(
        &self,
        position: &Position,
        overscan: f64,
        overrides: Option<&VisibilityOverrides>,
    ) -> bool {
        is_program_visible(
            position,
            self.scroll_y,
            self.scroll_x,
            self.height,
            self.width,
            overscan,
            overrides,
        )
    }

    /// Whether a sidebar row with the given top is mounted.
    pub fn is_sidebar_item_visible(&self, top: f64, overscan: f64) -> bool {
        is_sidebar_item_visible(top, self.scroll_y, self.height, overscan)
    }

    /// Range of mounted rows (start inclusive, end exclusive) for uniform
    /// rows of `row_height`. Matches [`Viewport::is_sidebar_item_visible`].
    pub fn visible_rows(&self, row_height: f64, row_count: usize, overscan: f64) -> (usize, usize) {
        if row_height <= 0.0 || row_count == 0 {
            return (0, 0);
        }
        // First row with top >= scroll_y - 3 * overscan.
        let first = ((self.scroll_y - overscan * OVERSCAN_MULTIPLIER) / row_height).ceil();
        // Rows with top < scroll_y + height.
        let end = ((self.scroll_y + self.height) / row_height).ceil();
        let start = clamp_index(first, row_count);
        let end = clamp_index(end, row_count);
        (start, end.max(start))
    }

    /// Convert content coordinates to screen coordinates
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.scroll_x, y - self.scroll_y)
    }

    /// Convert screen coordinates to content coordinates
    pub fn to_content(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (screen_x + self.scroll_x, screen_y + self.scroll_y)
    }

    /// Largest scroll offsets that still fill the viewport.
    pub fn max_scroll(&self, content_width: f64, content_height: f64) -> (f64, f64) {
        (
            (content_width - self.width).max(0.0),
            (content_height - self.height).max(0.0),
        )
    }

    /// Clamp scroll position to the content.
    pub fn clamp_scroll(&mut self, content_width: f64, content_height: f64) {
        let (max_x, max_y) = self.max_scroll(content_width, content_height);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(value: f64, len: usize) -> usize {
    // Negative and NaN inputs saturate to 0; the result is capped at `len`.
    let value = value.max(0.0);
    if value >= len as f64 {
        len
    } else {
        value as usize
    }
}
