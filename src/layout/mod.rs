//! Geometry engine for the guide.
//!
//! This module handles:
//! - Time to pixel conversion over the visible window
//! - Positioning programs and channels
//! - Grouping programs into per-channel rows (row mode)
//! - Mount decisions against the scrolled viewport

mod converter;
mod position;
pub mod units;
pub mod visibility;
mod viewport;

pub use converter::{convert_channels, convert_programs, ConvertParams, ProgramLayout};
pub use position::{
    build_channel_position, build_program_position, ProgramGeometry, EMPTY_ITEM_WIDTH,
};
pub use units::{DayWidthResources, TimeWindow};
pub use visibility::{is_program_visible, is_sidebar_item_visible, VisibilityOverrides};
pub use viewport::Viewport;
