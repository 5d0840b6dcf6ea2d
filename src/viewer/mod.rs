//! The guide itself: converted data, visibility, scroll commands and caller
//! callbacks behind one owner.
//!
//! [`Epg`] is host agnostic. A browser host uses the [`EpgView`] wrapper; a
//! native host drives [`Epg`] directly with its own clock and event loop:
//!
//! 1. forward native scroll events to [`Epg::on_scroll`],
//! 2. call [`Epg::on_frame`] from the animation loop and re-render when it
//!    reports a commit,
//! 3. apply the [`ScrollRequest`]s returned by the scroll commands.

mod animation;
#[cfg(target_arch = "wasm32")]
mod bindings;
mod debounce;
mod scroll;
mod store;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

pub use animation::{ScrollTask, TaskState, OFFSET_EPSILON};
#[cfg(target_arch = "wasm32")]
pub use bindings::EpgView;
pub use debounce::Debouncer;
pub use scroll::{
    EdgeReached, FrameUpdate, ScrollBehavior, ScrollBoundary, ScrollConfig, ScrollController,
    ScrollRequest, SurfaceMetrics,
};
pub use store::{Store, StoreRegistry, SubscriptionId};

use crate::error::Result;
use crate::layout::units::{parse_date_value, DayWidthResources, TimeWindow};
use crate::layout::visibility::VisibilityOverrides;
use crate::layout::{convert_channels, convert_programs, ConvertParams, ProgramLayout};
use crate::render::{Frame, ProgramContext, RenderStrategy, TimelineRuler};
use crate::types::{
    value_key, Channel, ChannelRow, EpgOptions, FieldKeys, PositionedChannel, PositionedProgram,
    Program, ProgramsByChannel,
};

/// Called with the channel id and the boundary program of its row.
pub type EdgeCallback = Box<dyn FnMut(&str, Option<&PositionedProgram>)>;
/// Picks the index of the airing program within a row.
pub type LiveProgramFn = Box<dyn Fn(&[PositionedProgram], NaiveDateTime) -> Option<usize>>;
/// Called with the channels currently mounted in the sidebar.
pub type LoadDataCallback = Box<dyn FnMut(&[PositionedChannel])>;

/// Optional caller hooks.
#[derive(Default)]
pub struct Callbacks {
    pub on_reach_beginning: Option<EdgeCallback>,
    pub on_reach_end: Option<EdgeCallback>,
    pub get_live_program: Option<LiveProgramFn>,
    pub on_load_data: Option<LoadDataCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_reach_beginning", &self.on_reach_beginning.is_some())
            .field("on_reach_end", &self.on_reach_end.is_some())
            .field("get_live_program", &self.get_live_program.is_some())
            .field("on_load_data", &self.on_load_data.is_some())
            .finish()
    }
}

/// Scroll surface a command or event targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface<'a> {
    /// The whole guide
    Page,
    /// One channel row in row mode, by channel id
    Row(&'a str),
}

/// Per-row state kept across unmounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowSnapshot {
    pub scroll_x: f64,
    pub boundary: ScrollBoundary,
}

/// Viewport size used until the host reports one.
const DEFAULT_LAYOUT_WIDTH: f64 = 800.0;
const DEFAULT_LAYOUT_HEIGHT: f64 = 600.0;

/// An electronic program guide instance.
pub struct Epg {
    options: EpgOptions,
    window: TimeWindow,
    resources: DayWidthResources,
    layout_width: f64,
    layout_height: f64,
    // Raw inputs, compared on update to skip needless conversions
    raw_channels: Vec<Channel>,
    raw_programs: Vec<Program>,
    channels: Vec<PositionedChannel>,
    layout: ProgramLayout,
    page: ScrollController,
    rows: IndexMap<String, ScrollController>,
    stores: StoreRegistry<RowSnapshot>,
    callbacks: Callbacks,
    loaded_range: Option<(usize, usize)>,
}

impl Epg {
    /// Build a guide over `channels` and `programs`.
    ///
    /// `today` resolves the default time window when the options name none.
    ///
    /// # Errors
    /// Returns an error when the options fail validation or the window dates
    /// cannot be parsed.
    pub fn new(
        options: EpgOptions,
        channels: Vec<Channel>,
        programs: Vec<Program>,
        today: NaiveDate,
    ) -> Result<Self> {
        options.validate()?;
        let window = TimeWindow::from_inputs(
            options.start_date.as_deref(),
            options.end_date.as_deref(),
            today,
        )?;
        let resources = DayWidthResources::new(
            options.day_width,
            &window,
            options.max_length,
            options.fixed_item_width(),
        );
        let page = ScrollController::new(
            SurfaceMetrics::default(),
            scroll_config(&options, resources.hour_width, false, false),
        );

        let mut epg = Self {
            layout_width: options.width.unwrap_or(DEFAULT_LAYOUT_WIDTH),
            layout_height: options.height.unwrap_or(DEFAULT_LAYOUT_HEIGHT),
            options,
            window,
            resources,
            raw_channels: channels,
            raw_programs: programs,
            channels: Vec::new(),
            layout: ProgramLayout::default(),
            page,
            rows: IndexMap::new(),
            stores: StoreRegistry::new(),
            callbacks: Callbacks::default(),
            loaded_range: None,
        };
        epg.recompute();
        Ok(epg)
    }

    /// Replace the channel and program lists.
    ///
    /// Returns false (and keeps the current layout) when both lists are
    /// unchanged.
    pub fn set_data(&mut self, channels: Vec<Channel>, programs: Vec<Program>) -> bool {
        if channels == self.raw_channels && programs == self.raw_programs {
            return false;
        }
        self.raw_channels = channels;
        self.raw_programs = programs;
        self.recompute();
        self.notify_load_data();
        true
    }

    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
        let (beginning, end) = self.pagination();
        for controller in self.rows.values_mut() {
            controller.set_pagination(beginning, end);
        }
        self.loaded_range = None;
        self.notify_load_data();
    }

    /// New layout size, sidebar included.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.layout_width = width;
        self.layout_height = height;
        self.refresh_metrics();
        self.notify_load_data();
    }

    pub fn options(&self) -> &EpgOptions {
        &self.options
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    pub fn resources(&self) -> &DayWidthResources {
        &self.resources
    }

    pub fn channels(&self) -> &[PositionedChannel] {
        &self.channels
    }

    pub fn programs(&self) -> &[PositionedProgram] {
        &self.layout.programs
    }

    /// Rows keyed by channel id; `None` outside row mode.
    pub fn programs_by_channel(&self) -> Option<&ProgramsByChannel> {
        self.layout.programs_by_channel.as_ref()
    }

    pub fn page(&self) -> &ScrollController {
        &self.page
    }

    /// Controller of a mounted row.
    pub fn row(&self, channel_id: &str) -> Option<&ScrollController> {
        self.rows.get(channel_id)
    }

    pub fn stores(&self) -> &StoreRegistry<RowSnapshot> {
        &self.stores
    }

    pub fn stores_mut(&mut self) -> &mut StoreRegistry<RowSnapshot> {
        &mut self.stores
    }

    pub fn content_width(&self) -> f64 {
        match &self.layout.programs_by_channel {
            Some(rows) => rows.values().map(|row| row.width).fold(0.0, f64::max),
            None => self.resources.day_width,
        }
    }

    pub fn content_height(&self) -> f64 {
        self.channels.len() as f64 * self.row_height()
    }

    /// Hour ruler, when the timeline is shown.
    pub fn timeline_ruler(&self) -> Option<TimelineRuler> {
        self.options.timeline_enabled().then(|| TimelineRuler {
            day_width: self.resources.day_width,
            hour_width: self.resources.hour_width,
            number_of_hours_in_day: self.resources.number_of_hours_in_day,
            offset_start_hours_range: self.resources.offset_start_hours_range,
            sidebar_width: self.sidebar_width(),
            is_sidebar: self.options.is_sidebar,
        })
    }

    /// Left offset of the "now" line; `None` once the window has ended or
    /// when the line is disabled.
    pub fn now_line_offset(&self, now: NaiveDateTime) -> Option<f64> {
        (self.options.line_enabled() && self.window.is_future(now))
            .then(|| self.window.offset_of(now, self.resources.hour_width))
    }

    pub fn is_program_visible(&self, program: &PositionedProgram) -> bool {
        self.page
            .viewport()
            .is_program_visible(&program.position, self.options.item_overscan, None)
    }

    /// Visibility of a program inside a row, against the row's own offset.
    pub fn is_row_program_visible(&self, channel_id: &str, program: &PositionedProgram) -> bool {
        let scroll_x = self.rows.get(channel_id).map_or(0.0, ScrollController::scroll_x);
        let overrides = VisibilityOverrides::row(scroll_x, self.layout_width);
        self.page.viewport().is_program_visible(
            &program.position,
            self.options.item_overscan,
            Some(&overrides),
        )
    }

    pub fn is_channel_visible(&self, channel: &PositionedChannel) -> bool {
        self.page
            .viewport()
            .is_sidebar_item_visible(channel.position.top, self.options.item_overscan)
    }

    /// Programs to mount in timeline mode.
    pub fn visible_programs(&self) -> Vec<&PositionedProgram> {
        self.layout
            .programs
            .iter()
            .filter(|program| self.is_program_visible(program))
            .collect()
    }

    pub fn visible_channels(&self) -> Vec<&PositionedChannel> {
        self.channels
            .iter()
            .filter(|channel| self.is_channel_visible(channel))
            .collect()
    }

    /// Rows to mount in row mode, culled vertically like the sidebar.
    pub fn visible_rows(&self) -> Vec<(&str, &ChannelRow)> {
        let Some(rows) = &self.layout.programs_by_channel else {
            return Vec::new();
        };
        let viewport = self.page.viewport();
        rows.iter()
            .filter(|(_, row)| {
                viewport.is_sidebar_item_visible(row.position.top, self.options.item_overscan)
            })
            .map(|(id, row)| (id.as_str(), row))
            .collect()
    }

    pub fn row_visible_programs(&self, channel_id: &str) -> Vec<&PositionedProgram> {
        self.layout
            .programs_by_channel
            .as_ref()
            .and_then(|rows| rows.get(channel_id))
            .map(|row| {
                row.programs
                    .iter()
                    .filter(|program| self.is_row_program_visible(channel_id, program))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Program airing on `channel_id` at `now`.
    ///
    /// Rows ask the caller's `get_live_program` first; without it the
    /// program whose `[since, till)` contains `now` wins.
    pub fn live_program(&self, channel_id: &str, now: NaiveDateTime) -> Option<&PositionedProgram> {
        let keys = &self.options.keys;
        let row = self
            .layout
            .programs_by_channel
            .as_ref()
            .and_then(|rows| rows.get(channel_id));
        match row {
            Some(row) => {
                let index = match &self.callbacks.get_live_program {
                    Some(pick) => pick(&row.programs, now)?,
                    None => row.programs.iter().position(|p| is_airing(p, now, keys))?,
                };
                row.programs.get(index)
            }
            None => self.layout.programs.iter().find(|p| {
                p.data.channel_ref(keys).map(value_key).as_deref() == Some(channel_id)
                    && is_airing(p, now, keys)
            }),
        }
    }

    /// Start tracking a row's scroll state.
    ///
    /// Returns the scroll the host should apply to the new row element: the
    /// offset captured when the row was last unmounted, or "now" when the
    /// guide scrolls to now on load.
    pub fn mount_row(&mut self, channel_id: &str, now: NaiveDateTime) -> Option<ScrollRequest> {
        let metrics = self.row_metrics(channel_id)?;
        let (beginning, end) = self.pagination();
        let mut controller = ScrollController::new(
            metrics,
            scroll_config(&self.options, self.resources.hour_width, beginning, end),
        );

        let restored = self.stores.get(channel_id).map(|store| store.state().scroll_x);
        let request = match restored {
            Some(scroll_x) => Some(controller.scroll_to(scroll_x, ScrollBehavior::Auto)),
            None if self.options.is_scroll_to_now => {
                let live = self.live_program(channel_id, now).map(|p| p.position);
                controller.scroll_to_now(now, &self.window, live.as_ref())
            }
            None => None,
        };
        if let Some(request) = &request {
            controller.apply(request, 0.0);
            controller.flush();
        }

        self.stores
            .get_or_create(channel_id, RowSnapshot::default)
            .set_state(|_| RowSnapshot {
                scroll_x: controller.scroll_x(),
                boundary: controller.boundary(),
            });
        tracing::debug!(channel = channel_id, restored = restored.is_some(), "row mounted");
        self.rows.insert(channel_id.to_string(), controller);
        request
    }

    /// Stop tracking a row, keeping its offset for the next mount.
    pub fn unmount_row(&mut self, channel_id: &str) -> bool {
        let Some(controller) = self.rows.shift_remove(channel_id) else {
            return false;
        };
        let (scroll_x, _) = controller.element_offset();
        if let Some(store) = self.stores.get_mut(channel_id) {
            store.set_state(|_| RowSnapshot {
                scroll_x,
                boundary: controller.boundary(),
            });
        }
        true
    }

    /// Forget a row's saved state.
    pub fn destroy_row(&mut self, channel_id: &str) {
        self.rows.shift_remove(channel_id);
        self.stores.destroy(channel_id);
    }

    /// Raw scroll event; returns false for an unknown row.
    pub fn on_scroll(&mut self, surface: Surface<'_>, x: f64, y: f64, now_ms: f64) -> bool {
        match self.controller_mut(surface) {
            Some(controller) => {
                controller.on_scroll(x, y, now_ms);
                true
            }
            None => false,
        }
    }

    /// Advance debounced commits and scroll animations.
    ///
    /// Dispatches edge callbacks and `on_load_data`; returns true when
    /// committed offsets changed and the visible set must be rebuilt.
    pub fn on_frame(&mut self, now_ms: f64) -> bool {
        let page_update = self.page.on_frame(now_ms);
        let mut committed = page_update.committed;
        let mut edges = Vec::new();

        for (id, controller) in &mut self.rows {
            let update = controller.on_frame(now_ms);
            if update.committed {
                committed = true;
                if let Some(store) = self.stores.get_mut(id) {
                    store.set_state(|_| RowSnapshot {
                        scroll_x: controller.scroll_x(),
                        boundary: controller.boundary(),
                    });
                }
            }
            if let Some(edge) = update.edge {
                edges.push((id.clone(), edge));
            }
        }

        for (id, edge) in edges {
            self.dispatch_edge(&id, edge);
        }
        if page_update.committed {
            self.notify_load_data();
        }
        committed
    }

    /// Earliest time [`Epg::on_frame`] has pending debounced work.
    pub fn next_deadline(&self) -> Option<f64> {
        std::iter::once(&self.page)
            .chain(self.rows.values())
            .filter_map(ScrollController::next_deadline)
            .reduce(f64::min)
    }

    /// Initial page scroll when the guide opens on "now".
    pub fn initial_scroll(&mut self, now: NaiveDateTime) -> Option<ScrollRequest> {
        if !self.options.is_scroll_to_now || self.options.is_row {
            return None;
        }
        self.scroll_to_now(Surface::Page, now)
    }

    pub fn scroll_to_now(&mut self, surface: Surface<'_>, now: NaiveDateTime) -> Option<ScrollRequest> {
        let live = match surface {
            Surface::Page => None,
            Surface::Row(id) => self.live_program(id, now).map(|p| p.position),
        };
        let window = &self.window;
        let controller = match surface {
            Surface::Page => &mut self.page,
            Surface::Row(id) => self.rows.get_mut(id)?,
        };
        controller.scroll_to_now(now, window, live.as_ref())
    }

    /// Vertical scroll of the page by `delta`, one hour width by default.
    pub fn scroll_top(&mut self, delta: Option<f64>) -> ScrollRequest {
        self.page.scroll_top(delta)
    }

    pub fn scroll_left(
        &mut self,
        surface: Surface<'_>,
        delta: Option<f64>,
        now_ms: f64,
    ) -> Option<ScrollRequest> {
        self.controller_mut(surface)
            .map(|controller| controller.scroll_left(delta, now_ms))
    }

    pub fn scroll_right(
        &mut self,
        surface: Surface<'_>,
        delta: Option<f64>,
        now_ms: f64,
    ) -> Option<ScrollRequest> {
        self.controller_mut(surface)
            .map(|controller| controller.scroll_right(delta, now_ms))
    }

    pub fn scroll_to(
        &mut self,
        surface: Surface<'_>,
        left: f64,
        behavior: ScrollBehavior,
    ) -> Option<ScrollRequest> {
        self.controller_mut(surface)
            .map(|controller| controller.scroll_to(left, behavior))
    }

    /// Build the visible frame with `strategy`.
    pub fn render<R: RenderStrategy>(&self, strategy: &mut R, now: NaiveDateTime) -> Frame<R::Output> {
        let keys = &self.options.keys;
        let timeline = self
            .timeline_ruler()
            .and_then(|ruler| strategy.timeline(&ruler));

        let mut channels = Vec::new();
        if self.options.is_sidebar {
            for channel in self.visible_channels() {
                channels.push(strategy.channel(channel));
            }
        }

        let mut content = Vec::new();
        if self.options.is_row {
            for (id, row) in self.visible_rows() {
                let live = self.live_program(id, now);
                let mut programs = Vec::new();
                for program in self.row_visible_programs(id) {
                    let context = ProgramContext {
                        is_live: live.is_some_and(|l| std::ptr::eq(l, program)),
                        in_row: true,
                    };
                    programs.push(strategy.program(program, &context));
                }
                content.push(strategy.row(id, row, programs));
            }
        } else {
            for program in self.visible_programs() {
                let context = ProgramContext {
                    is_live: is_airing(program, now, keys),
                    in_row: false,
                };
                content.push(strategy.program(program, &context));
            }
        }

        Frame {
            timeline,
            channels,
            content,
            now_line: self.now_line_offset(now),
            content_width: self.content_width(),
            content_height: self.content_height(),
        }
    }

    fn recompute(&mut self) {
        self.channels = convert_channels(
            &self.raw_channels,
            self.options.item_height,
            self.options.row_offset_top,
        );
        let params = ConvertParams {
            window: &self.window,
            item_width: self.options.fixed_item_width(),
            item_height: self.options.item_height,
            hour_width: self.resources.hour_width,
            row_offset_top: self.options.row_offset_top,
            row_mode: self.options.is_row,
            keys: &self.options.keys,
        };
        self.layout = convert_programs(&self.raw_programs, &self.raw_channels, &params);
        self.refresh_metrics();
        self.loaded_range = None;
    }

    fn refresh_metrics(&mut self) {
        self.page.set_metrics(self.page_metrics());
        let updates: Vec<(String, SurfaceMetrics)> = self
            .rows
            .keys()
            .filter_map(|id| self.row_metrics(id).map(|m| (id.clone(), m)))
            .collect();
        for (id, metrics) in updates {
            if let Some(controller) = self.rows.get_mut(&id) {
                controller.set_metrics(metrics);
            }
        }
    }

    fn page_metrics(&self) -> SurfaceMetrics {
        SurfaceMetrics {
            content_width: self.content_width(),
            content_height: self.content_height(),
            layout_width: self.layout_width,
            layout_height: self.layout_height,
            sidebar_width: self.sidebar_width(),
        }
    }

    fn row_metrics(&self, channel_id: &str) -> Option<SurfaceMetrics> {
        let row = self.layout.programs_by_channel.as_ref()?.get(channel_id)?;
        Some(SurfaceMetrics {
            content_width: row.width,
            content_height: self.options.item_height,
            layout_width: self.layout_width,
            layout_height: self.options.item_height,
            sidebar_width: self.sidebar_width(),
        })
    }

    fn row_height(&self) -> f64 {
        self.options.item_height + self.options.row_offset_top
    }

    fn sidebar_width(&self) -> f64 {
        if self.options.is_sidebar {
            self.options.sidebar_width
        } else {
            0.0
        }
    }

    fn pagination(&self) -> (bool, bool) {
        (
            self.callbacks.on_reach_beginning.is_some(),
            self.callbacks.on_reach_end.is_some(),
        )
    }

    fn controller_mut(&mut self, surface: Surface<'_>) -> Option<&mut ScrollController> {
        match surface {
            Surface::Page => Some(&mut self.page),
            Surface::Row(id) => self.rows.get_mut(id),
        }
    }

    fn dispatch_edge(&mut self, channel_id: &str, edge: EdgeReached) {
        let row = self
            .layout
            .programs_by_channel
            .as_ref()
            .and_then(|rows| rows.get(channel_id));
        tracing::debug!(channel = channel_id, ?edge, "row edge reached");
        match edge {
            EdgeReached::Beginning => {
                if let Some(callback) = self.callbacks.on_reach_beginning.as_mut() {
                    callback(channel_id, row.and_then(ChannelRow::first_program));
                }
            }
            EdgeReached::End => {
                if let Some(callback) = self.callbacks.on_reach_end.as_mut() {
                    callback(channel_id, row.and_then(ChannelRow::last_program));
                }
            }
        }
    }

    /// Report the mounted channel range when it changes.
    fn notify_load_data(&mut self) {
        let range = self.page.viewport().visible_rows(
            self.row_height(),
            self.channels.len(),
            self.options.item_overscan,
        );
        if self.loaded_range == Some(range) {
            return;
        }
        self.loaded_range = Some(range);
        let (start, end) = range;
        if let (Some(callback), Some(visible)) = (
            self.callbacks.on_load_data.as_mut(),
            self.channels.get(start..end),
        ) {
            callback(visible);
        }
    }
}

impl fmt::Debug for Epg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Epg")
            .field("window", &self.window)
            .field("channels", &self.channels.len())
            .field("programs", &self.layout.programs.len())
            .field("mounted_rows", &self.rows.len())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

fn scroll_config(options: &EpgOptions, hour_width: f64, beginning: bool, end: bool) -> ScrollConfig {
    ScrollConfig {
        item_width: options.fixed_item_width(),
        hour_width,
        debounce_wait: options.debounce_wait,
        debounce_max_wait: options.debounce_max_wait,
        timeout_ms: options.scroll_timeout_ms,
        paginate_beginning: beginning,
        paginate_end: end,
    }
}

fn is_airing(program: &PositionedProgram, now: NaiveDateTime, keys: &FieldKeys) -> bool {
    let since = program.data.since(keys).and_then(parse_date_value);
    let till = program.data.till(keys).and_then(parse_date_value);
    matches!((since, till), (Some(since), Some(till)) if since <= now && now < till)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::units::parse_date;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn channels(n: usize) -> Vec<Channel> {
        (0..n)
            .map(|i| Channel::from(json!({"uuid": format!("ch{i}"), "logo": "logo.png"})))
            .collect()
    }

    fn hourly(channel: &str, hours: u32) -> Vec<Program> {
        (0..hours)
            .map(|h| {
                Program::from(json!({
                    "channelUuid": channel,
                    "title": format!("{channel} #{h}"),
                    "since": format!("2024-01-01T{h:02}:00:00"),
                    "till": format!("2024-01-01T{:02}:00:00", h + 1),
                }))
            })
            .collect()
    }

    fn timeline_options() -> EpgOptions {
        EpgOptions {
            start_date: Some("2024-01-01T00:00:00".into()),
            day_width: 2400.0,
            width: Some(700.0),
            height: Some(400.0),
            ..EpgOptions::default()
        }
    }

    fn row_options() -> EpgOptions {
        EpgOptions {
            is_row: true,
            item_width: Some(150.0),
            debounce_wait: 0.0,
            debounce_max_wait: 0.0,
            ..timeline_options()
        }
    }

    #[test]
    fn test_timeline_visibility_follows_committed_scroll() {
        let mut epg = Epg::new(timeline_options(), channels(2), hourly("ch0", 20), today()).unwrap();
        assert_eq!(epg.resources().hour_width, 100.0);
        assert_eq!(epg.content_width(), 2400.0);
        assert_eq!(epg.content_height(), 160.0);

        let first: Vec<_> = epg.visible_programs().iter().map(|p| p.position.left).collect();
        assert_eq!(first.first(), Some(&0.0));
        assert!(first.iter().all(|left| *left <= 700.0));

        epg.on_scroll(Surface::Page, 1200.0, 0.0, 0.0);
        assert!(!epg.on_frame(5.0));
        assert!(epg.on_frame(25.0));
        let lefts: Vec<_> = epg.visible_programs().iter().map(|p| p.position.left).collect();
        assert!(!lefts.contains(&0.0));
        assert!(lefts.contains(&1200.0));
    }

    #[test]
    fn test_set_data_is_memoized() {
        let mut epg = Epg::new(timeline_options(), channels(1), hourly("ch0", 2), today()).unwrap();
        assert!(!epg.set_data(channels(1), hourly("ch0", 2)));
        assert!(epg.set_data(channels(1), hourly("ch0", 3)));
        assert_eq!(epg.programs().len(), 3);
    }

    #[test]
    fn test_live_program_default_and_override() {
        let mut epg = Epg::new(row_options(), channels(1), hourly("ch0", 6), today()).unwrap();
        let now = parse_date("2024-01-01T03:30:00").unwrap();
        assert_eq!(
            epg.live_program("ch0", now).unwrap().data.get("title"),
            Some(&json!("ch0 #3"))
        );

        epg.set_callbacks(Callbacks {
            get_live_program: Some(Box::new(|programs: &[PositionedProgram], _| {
                programs.len().checked_sub(1)
            })),
            ..Callbacks::default()
        });
        assert_eq!(
            epg.live_program("ch0", now).unwrap().data.get("title"),
            Some(&json!("ch0 #5"))
        );
    }

    #[test]
    fn test_row_offset_survives_remount() {
        let mut epg = Epg::new(row_options(), channels(1), hourly("ch0", 12), today()).unwrap();
        let now = parse_date("2024-01-01T08:00:00").unwrap();
        assert_eq!(epg.mount_row("ch0", now), None);

        epg.on_scroll(Surface::Row("ch0"), 450.0, 0.0, 0.0);
        assert!(epg.on_frame(1.0));
        assert_eq!(epg.stores().get("ch0").unwrap().state().scroll_x, 450.0);
        assert!(epg.unmount_row("ch0"));
        assert!(epg.row("ch0").is_none());

        let request = epg.mount_row("ch0", now).unwrap();
        assert_eq!(request.left, Some(450.0));
        assert_eq!(epg.row("ch0").unwrap().scroll_x(), 450.0);

        epg.destroy_row("ch0");
        assert!(epg.stores().is_empty());
    }

    #[test]
    fn test_row_scroll_to_now_uses_live_program() {
        let options = EpgOptions {
            is_scroll_to_now: true,
            ..row_options()
        };
        let mut epg = Epg::new(options, channels(1), hourly("ch0", 12), today()).unwrap();
        let now = parse_date("2024-01-01T04:10:00").unwrap();
        // Live program #4 sits at 600; one item before it.
        let request = epg.mount_row("ch0", now).unwrap();
        assert_eq!(request.left, Some(450.0));
    }

    #[test]
    fn test_edge_callback_receives_boundary_program() {
        let mut epg = Epg::new(row_options(), channels(1), hourly("ch0", 8), today()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        epg.set_callbacks(Callbacks {
            on_reach_end: Some(Box::new(move |id: &str, program: Option<&PositionedProgram>| {
                let title = program.and_then(|p| p.data.get("title")).cloned();
                sink.borrow_mut().push((id.to_string(), title));
            })),
            ..Callbacks::default()
        });
        let now = parse_date("2024-01-01T00:00:00").unwrap();
        epg.mount_row("ch0", now);

        // Row is 1200 wide in a 700 layout with a 200 sidebar: max offset 700.
        epg.on_scroll(Surface::Row("ch0"), 600.0, 0.0, 0.0);
        let request = epg.scroll_right(Surface::Row("ch0"), None, 0.0).unwrap();
        assert_eq!(request.left, Some(700.0));
        epg.on_scroll(Surface::Row("ch0"), 700.0, 0.0, 16.0);
        epg.on_frame(16.0);

        assert_eq!(
            *seen.borrow(),
            vec![("ch0".to_string(), Some(json!("ch0 #7")))]
        );
    }

    #[test]
    fn test_load_data_reports_mounted_channels() {
        let options = EpgOptions {
            height: Some(160.0),
            item_overscan: 0.0,
            ..timeline_options()
        };
        let mut epg = Epg::new(options, channels(10), Vec::new(), today()).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        epg.set_callbacks(Callbacks {
            on_load_data: Some(Box::new(move |visible: &[PositionedChannel]| {
                sink.borrow_mut().push(visible.len());
            })),
            ..Callbacks::default()
        });
        epg.on_scroll(Surface::Page, 0.0, 400.0, 0.0);
        epg.on_frame(100.0);
        // Unchanged range is not reported twice.
        epg.on_frame(200.0);
        assert_eq!(*seen.borrow(), vec![2, 2]);
    }

    #[test]
    fn test_now_line() {
        let epg = Epg::new(timeline_options(), channels(1), Vec::new(), today()).unwrap();
        let now = parse_date("2024-01-01T06:30:00").unwrap();
        assert_eq!(epg.now_line_offset(now), Some(650.0));
        let later = parse_date("2024-01-03T00:00:00").unwrap();
        assert_eq!(epg.now_line_offset(later), None);

        let paged = Epg::new(row_options(), channels(1), Vec::new(), today()).unwrap();
        assert_eq!(paged.now_line_offset(now), None);
        assert!(paged.timeline_ruler().is_none());
    }

    #[test]
    fn test_unknown_row_commands() {
        let mut epg = Epg::new(row_options(), channels(1), Vec::new(), today()).unwrap();
        let now = parse_date("2024-01-01T00:00:00").unwrap();
        assert!(epg.mount_row("missing", now).is_none());
        assert!(!epg.on_scroll(Surface::Row("missing"), 1.0, 0.0, 0.0));
        assert!(epg.scroll_left(Surface::Row("missing"), None, 0.0).is_none());
    }
}
