//! epgview - virtualized electronic program guide engine
//!
//! Turns channel and program records into pixel geometry and decides which
//! items are mounted for the current scroll position:
//! - Time-scaled timeline and fixed-width paged placement
//! - Independently scrolled per-channel rows with edge pagination
//! - Overscan-based culling for channels and programs
//! - Debounced scroll state and cancellable scroll animations
//!
//! Presentation is left to the host through [`render::RenderStrategy`].
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { EpgView } from 'epgview';
//! await init();
//! const epg = new EpgView({ dayWidth: 7200, isSidebar: true }, channels, programs);
//! epg.onScroll(el.scrollLeft, el.scrollTop);
//! if (epg.onFrame()) draw(epg.frame());
//! ```

pub mod error;
pub mod layout;
pub mod render;
pub mod types;
pub mod viewer;

use wasm_bindgen::prelude::*;

pub use error::{EpgError, Result};
pub use render::{Frame, ProgramContext, RenderStrategy, SnapshotRenderer, TimelineRuler};
#[cfg(target_arch = "wasm32")]
pub use viewer::EpgView;
pub use viewer::{Callbacks, Epg, Surface};

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
