//! Scroll state for one scrollable surface (the whole guide, or one row in
//! row mode).
//!
//! The host owns the native scroll element. It reports raw offsets through
//! [`ScrollController::on_scroll`], drives [`ScrollController::on_frame`] from
//! its animation loop, and applies the [`ScrollRequest`]s returned by the
//! commands. Committed offsets lag raw ones by the debounce window.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::animation::{ScrollTask, OFFSET_EPSILON};
use super::debounce::Debouncer;
use crate::layout::units::{pixel_offset, start_of_day, TimeWindow};
use crate::layout::Viewport;
use crate::types::Position;

/// Native scroll behavior requested from the host.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// Scroll the host should perform, shaped like DOM `ScrollToOptions`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct ScrollRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    pub behavior: ScrollBehavior,
}

impl ScrollRequest {
    pub fn left(left: f64, behavior: ScrollBehavior) -> Self {
        Self {
            left: Some(left),
            top: None,
            behavior,
        }
    }

    pub fn top(top: f64, behavior: ScrollBehavior) -> Self {
        Self {
            left: None,
            top: Some(top),
            behavior,
        }
    }
}

/// Horizontal boundary marker of a surface.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBoundary {
    #[default]
    Beginning,
    Middle,
    End,
}

impl ScrollBoundary {
    /// Value of the `data-state` attribute, `None` when it should be removed.
    pub fn as_attribute(self) -> Option<&'static str> {
        match self {
            Self::Beginning => Some("beginning"),
            Self::Middle => None,
            Self::End => Some("end"),
        }
    }
}

/// Pagination signal raised when an animated scroll settles at an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeReached {
    Beginning,
    End,
}

/// Sizes of a scrollable surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceMetrics {
    /// Full scrollable width of the content
    pub content_width: f64,
    pub content_height: f64,
    /// Width of the whole layout, sidebar included
    pub layout_width: f64,
    pub layout_height: f64,
    pub sidebar_width: f64,
}

impl SurfaceMetrics {
    /// Largest horizontal offset; the layout width includes the sidebar.
    pub fn max_scroll_x(&self) -> f64 {
        (self.content_width - self.layout_width + self.sidebar_width).max(0.0)
    }
}

/// Step sizes, timing and pagination switches of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// Fixed item width; the default horizontal step is two items
    pub item_width: Option<f64>,
    /// Default vertical step and time scale for scroll-to-now
    pub hour_width: f64,
    pub debounce_wait: f64,
    pub debounce_max_wait: f64,
    pub timeout_ms: f64,
    /// Animate left scrolls and report reaching the beginning
    pub paginate_beginning: bool,
    /// Animate right scrolls and report reaching the end
    pub paginate_end: bool,
}

/// What a frame changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameUpdate {
    /// Committed offsets changed; visibility must be recomputed
    pub committed: bool,
    pub edge: Option<EdgeReached>,
}

/// Live and committed scroll state of one surface.
#[derive(Debug, Clone)]
pub struct ScrollController {
    viewport: Viewport,
    element_x: f64,
    element_y: f64,
    metrics: SurfaceMetrics,
    config: ScrollConfig,
    debouncer: Debouncer<(f64, f64)>,
    task: Option<ScrollTask<EdgeReached>>,
    next_task_id: u64,
    boundary: ScrollBoundary,
}

impl ScrollController {
    pub fn new(metrics: SurfaceMetrics, config: ScrollConfig) -> Self {
        let mut controller = Self {
            viewport: Viewport::with_size(metrics.layout_width, metrics.layout_height),
            element_x: 0.0,
            element_y: 0.0,
            metrics,
            config,
            debouncer: Debouncer::new(config.debounce_wait, config.debounce_max_wait),
            task: None,
            next_task_id: 0,
            boundary: ScrollBoundary::Beginning,
        };
        controller.update_boundary();
        controller
    }

    /// Committed viewport, the input of visibility tests.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_x(&self) -> f64 {
        self.viewport.scroll_x
    }

    pub fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    /// Latest offsets reported by the host, not yet debounced.
    pub fn element_offset(&self) -> (f64, f64) {
        (self.element_x, self.element_y)
    }

    pub fn metrics(&self) -> &SurfaceMetrics {
        &self.metrics
    }

    pub fn boundary(&self) -> ScrollBoundary {
        self.boundary
    }

    pub fn task(&self) -> Option<&ScrollTask<EdgeReached>> {
        self.task.as_ref()
    }

    /// Next time [`ScrollController::on_frame`] has work to do.
    pub fn next_deadline(&self) -> Option<f64> {
        self.debouncer.deadline()
    }

    pub fn set_metrics(&mut self, metrics: SurfaceMetrics) {
        self.metrics = metrics;
        self.viewport.resize(metrics.layout_width, metrics.layout_height);
        self.update_boundary();
    }

    pub fn set_pagination(&mut self, beginning: bool, end: bool) {
        self.config.paginate_beginning = beginning;
        self.config.paginate_end = end;
    }

    /// Raw scroll event from the host.
    pub fn on_scroll(&mut self, x: f64, y: f64, now_ms: f64) {
        self.element_x = x;
        self.element_y = y;
        self.update_boundary();
        self.debouncer.push((x, y), now_ms);
    }

    /// Advance debounced commits and the pending animation.
    pub fn on_frame(&mut self, now_ms: f64) -> FrameUpdate {
        let mut update = FrameUpdate::default();
        if let Some((x, y)) = self.debouncer.poll(now_ms) {
            update.committed = self.commit(x, y);
        }
        if let Some(task) = self.task.as_mut() {
            update.edge = task.poll(self.element_x, now_ms);
            if !task.is_running() {
                self.task = None;
            }
        }
        update
    }

    /// Commit pending offsets immediately.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some((x, y)) => self.commit(x, y),
            None => false,
        }
    }

    /// Scroll so that "now" is in view. No-op unless the window starts today.
    ///
    /// With a live program the row is aligned one item before it, otherwise
    /// the offset of `now` within the window is used.
    pub fn scroll_to_now(
        &mut self,
        now: NaiveDateTime,
        window: &TimeWindow,
        live_program: Option<&Position>,
    ) -> Option<ScrollRequest> {
        if !window.starts_on(now.date()) {
            return None;
        }
        self.cancel_task();
        let left = match live_program {
            Some(position) => (position.left - self.config.item_width.unwrap_or(0.0)).max(0.0),
            None => pixel_offset(
                start_of_day(now),
                now,
                window,
                self.config.hour_width,
                Some(0),
                self.config.item_width,
            ),
        };
        tracing::debug!(left, "scroll to now");
        Some(ScrollRequest::left(left, ScrollBehavior::Auto))
    }

    /// Scroll down by `delta`, one hour width by default.
    pub fn scroll_top(&mut self, delta: Option<f64>) -> ScrollRequest {
        self.cancel_task();
        let delta = non_zero(delta).unwrap_or(self.config.hour_width);
        ScrollRequest::top(self.element_y + delta, ScrollBehavior::Auto)
    }

    /// Scroll left by `delta`, two items by default.
    pub fn scroll_left(&mut self, delta: Option<f64>, now_ms: f64) -> ScrollRequest {
        self.cancel_task();
        let left = self.element_x - self.step(delta);
        let target = left.max(0.0);
        if self.config.paginate_beginning {
            let edge = (left <= 0.0).then_some(EdgeReached::Beginning);
            self.start_task(target, now_ms, edge);
        }
        ScrollRequest::left(target, ScrollBehavior::Smooth)
    }

    /// Scroll right by `delta`, two items by default.
    pub fn scroll_right(&mut self, delta: Option<f64>, now_ms: f64) -> ScrollRequest {
        self.cancel_task();
        let right = self.element_x + self.step(delta);
        let max = self.metrics.max_scroll_x();
        let target = right.min(max);
        if self.config.paginate_end {
            let edge = (right >= max).then_some(EdgeReached::End);
            self.start_task(target, now_ms, edge);
        }
        ScrollRequest::left(target, ScrollBehavior::Smooth)
    }

    /// Jump to an absolute horizontal offset.
    pub fn scroll_to(&mut self, left: f64, behavior: ScrollBehavior) -> ScrollRequest {
        self.cancel_task();
        ScrollRequest::left(left.clamp(0.0, self.metrics.max_scroll_x()), behavior)
    }

    /// Apply a request as an instant scroll, for hosts without a native
    /// scroll element.
    pub fn apply(&mut self, request: &ScrollRequest, now_ms: f64) {
        let x = request.left.unwrap_or(self.element_x);
        let y = request.top.unwrap_or(self.element_y);
        self.on_scroll(x, y, now_ms);
    }

    fn commit(&mut self, x: f64, y: f64) -> bool {
        let changed = (x - self.viewport.scroll_x).abs() > f64::EPSILON
            || (y - self.viewport.scroll_y).abs() > f64::EPSILON;
        if changed {
            self.viewport.set_scroll(x, y);
            tracing::debug!(scroll_x = x, scroll_y = y, "scroll committed");
        }
        changed
    }

    fn step(&self, delta: Option<f64>) -> f64 {
        non_zero(delta).unwrap_or(self.config.item_width.unwrap_or(0.0) * 2.0)
    }

    fn start_task(&mut self, target: f64, now_ms: f64, edge: Option<EdgeReached>) {
        self.next_task_id += 1;
        self.task = Some(ScrollTask::start(
            self.next_task_id,
            target,
            now_ms,
            self.config.timeout_ms,
            edge,
        ));
    }

    fn cancel_task(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
            tracing::trace!(task = task.id(), "scroll animation superseded");
        }
    }

    fn update_boundary(&mut self) {
        let max = self.metrics.max_scroll_x();
        self.boundary = if self.element_x <= 0.0 {
            ScrollBoundary::Beginning
        } else if self.element_x >= max - OFFSET_EPSILON {
            ScrollBoundary::End
        } else {
            ScrollBoundary::Middle
        };
    }
}

fn non_zero(delta: Option<f64>) -> Option<f64> {
    delta.filter(|d| d.abs() > f64::EPSILON)
}
