//! Mount decisions for positioned items.
//!
//! Only items overlapping the scrolled viewport (plus an overscan margin
//! below the fold) are mounted.

use crate::types::Position;

/// Items this many overscan margins past the top edge stay mounted.
pub const OVERSCAN_MULTIPLIER: f64 = 3.0;

/// Row-local replacements for the page-level scroll state.
///
/// Each row scrolls on its own in row mode, so a row passes its own offsets
/// and marks the test as row context, which keeps zero-width items eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisibilityOverrides {
    pub scroll_x: Option<f64>,
    pub scroll_y: Option<f64>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
    pub in_row: bool,
}

impl VisibilityOverrides {
    /// Overrides for a row scrolled to `scroll_x` within `viewport_width`.
    pub fn row(scroll_x: f64, viewport_width: f64) -> Self {
        Self {
            scroll_x: Some(scroll_x),
            viewport_width: Some(viewport_width),
            in_row: true,
            ..Self::default()
        }
    }
}

/// Whether a program block should be mounted.
///
/// Rules, in order: zero-width items are culled outside row context; items
/// scrolled more than `3 * overscan` above the viewport top or starting at
/// or below its bottom are culled; otherwise the item is visible when its
/// horizontal span `[left, edge_end]` touches the viewport.
#[allow(clippy::too_many_arguments)]
pub fn is_program_visible(
    position: &Position,
    scroll_y: f64,
    scroll_x: f64,
    viewport_height: f64,
    viewport_width: f64,
    overscan: f64,
    overrides: Option<&VisibilityOverrides>,
) -> bool {
    let (scroll_x, scroll_y, viewport_width, viewport_height, in_row) = match overrides {
        Some(o) => (
            o.scroll_x.unwrap_or(scroll_x),
            o.scroll_y.unwrap_or(scroll_y),
            o.viewport_width.unwrap_or(viewport_width),
            o.viewport_height.unwrap_or(viewport_height),
            o.in_row,
        ),
        None => (scroll_x, scroll_y, viewport_width, viewport_height, false),
    };

    if position.width <= 0.0 && !in_row {
        return false;
    }

    if !is_vertically_visible(position.top, scroll_y, viewport_height, overscan) {
        return false;
    }

    scroll_x + viewport_width >= position.left && scroll_x <= position.edge_end
}

/// Whether a channel sidebar row should be mounted. The sidebar only
/// scrolls vertically.
pub fn is_sidebar_item_visible(
    top: f64,
    scroll_y: f64,
    viewport_height: f64,
    overscan: f64,
) -> bool {
    is_vertically_visible(top, scroll_y, viewport_height, overscan)
}

fn is_vertically_visible(top: f64, scroll_y: f64, viewport_height: f64, overscan: f64) -> bool {
    if scroll_y > top + overscan * OVERSCAN_MULTIPLIER {
        return false;
    }
    scroll_y + viewport_height > top
}
