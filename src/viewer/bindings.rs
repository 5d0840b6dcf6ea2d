//! JavaScript facade over [`Epg`].
//!
//! Records and options cross the boundary as plain JS objects. Scroll
//! commands return `ScrollToOptions`-shaped objects (or `undefined`) that the
//! host passes to `element.scrollTo`. Callbacks run synchronously inside the
//! calling method and must not call back into the same `EpgView`.

use js_sys::{Date, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Callbacks, EdgeCallback, Epg, ScrollBehavior, ScrollRequest, Surface};
use crate::error::EpgError;
use crate::layout::units::format_time;
use crate::render::SnapshotRenderer;
use crate::types::{Channel, EpgOptions, PositionedChannel, PositionedProgram, Program};

/// Monotonic clock for debouncing and animation timeouts.
fn now_ms() -> f64 {
    if let Some(window) = web_sys::window() {
        if let Some(perf) = window.performance() {
            return perf.now();
        }
    }
    Date::now()
}

/// Wall-clock "now" in the viewer's local time.
fn local_now() -> Result<NaiveDateTime, EpgError> {
    let d = Date::new_0();
    let year = i32::try_from(d.get_full_year()).map_err(|e| EpgError::Other(e.to_string()))?;
    NaiveDate::from_ymd_opt(year, d.get_month() + 1, d.get_date())
        .and_then(|date| {
            date.and_hms_milli_opt(
                d.get_hours(),
                d.get_minutes(),
                d.get_seconds(),
                d.get_milliseconds(),
            )
        })
        .ok_or_else(|| EpgError::InvalidDate("local clock".to_string()))
}

/// Serialize with plain objects rather than ES `Map`s.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, EpgError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

fn request_to_js(request: Option<ScrollRequest>) -> Result<JsValue, EpgError> {
    match request {
        Some(request) => to_js(&request),
        None => Ok(JsValue::UNDEFINED),
    }
}

fn surface(channel_id: Option<&str>) -> Surface<'_> {
    channel_id.map_or(Surface::Page, Surface::Row)
}

fn edge_callback(f: Function) -> EdgeCallback {
    Box::new(move |channel_id: &str, program: Option<&PositionedProgram>| {
        let program = program
            .and_then(|p| to_js(p).ok())
            .unwrap_or(JsValue::NULL);
        if let Err(err) = f.call2(&JsValue::NULL, &JsValue::from_str(channel_id), &program) {
            tracing::warn!(?err, "edge callback threw");
        }
    })
}

/// Read an optional function property of the callbacks object.
fn function_prop(object: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(object, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

/// The guide, exported to JavaScript
#[wasm_bindgen]
pub struct EpgView {
    epg: Epg,
}

#[wasm_bindgen]
impl EpgView {
    /// Create a guide from an options object and the channel/program arrays.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue, channels: JsValue, programs: JsValue) -> Result<EpgView, JsValue> {
        console_error_panic_hook::set_once();
        let options: EpgOptions = if options.is_undefined() || options.is_null() {
            EpgOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(EpgError::from)?
        };
        let channels: Vec<Channel> =
            serde_wasm_bindgen::from_value(channels).map_err(EpgError::from)?;
        let programs: Vec<Program> =
            serde_wasm_bindgen::from_value(programs).map_err(EpgError::from)?;
        let today = local_now()?.date();
        Ok(Self {
            epg: Epg::new(options, channels, programs, today)?,
        })
    }

    /// Replace channels and programs; false when nothing changed.
    #[wasm_bindgen(js_name = "setData")]
    pub fn set_data(&mut self, channels: JsValue, programs: JsValue) -> Result<bool, JsValue> {
        let channels: Vec<Channel> =
            serde_wasm_bindgen::from_value(channels).map_err(EpgError::from)?;
        let programs: Vec<Program> =
            serde_wasm_bindgen::from_value(programs).map_err(EpgError::from)?;
        Ok(self.epg.set_data(channels, programs))
    }

    /// Install `{ onReachBeginning, onReachEnd, getLiveProgram, onLoadData }`.
    /// Missing properties clear the corresponding hook.
    #[wasm_bindgen(js_name = "setCallbacks")]
    pub fn set_callbacks(&mut self, callbacks: &JsValue) {
        let mut hooks = Callbacks {
            on_reach_beginning: function_prop(callbacks, "onReachBeginning").map(edge_callback),
            on_reach_end: function_prop(callbacks, "onReachEnd").map(edge_callback),
            ..Callbacks::default()
        };
        if let Some(f) = function_prop(callbacks, "getLiveProgram") {
            hooks.get_live_program = Some(Box::new(
                move |programs: &[PositionedProgram], now: NaiveDateTime| {
                    let programs = to_js(programs).ok()?;
                    let index = f
                        .call2(&JsValue::NULL, &programs, &JsValue::from_str(&format_time(now)))
                        .ok()?;
                    // Negative or fractional indices select nothing.
                    serde_wasm_bindgen::from_value::<usize>(index).ok()
                },
            ));
        }
        if let Some(f) = function_prop(callbacks, "onLoadData") {
            hooks.on_load_data = Some(Box::new(move |channels: &[PositionedChannel]| {
                if let Ok(channels) = to_js(channels) {
                    if let Err(err) = f.call1(&JsValue::NULL, &channels) {
                        tracing::warn!(?err, "onLoadData threw");
                    }
                }
            }));
        }
        self.epg.set_callbacks(hooks);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.epg.resize(width, height);
    }

    /// Native scroll event of the page element.
    #[wasm_bindgen(js_name = "onScroll")]
    pub fn on_scroll(&mut self, x: f64, y: f64) {
        self.epg.on_scroll(Surface::Page, x, y, now_ms());
    }

    /// Native scroll event of a row element.
    #[wasm_bindgen(js_name = "onRowScroll")]
    pub fn on_row_scroll(&mut self, channel_id: &str, x: f64) -> bool {
        self.epg.on_scroll(Surface::Row(channel_id), x, 0.0, now_ms())
    }

    /// Call once per animation frame; true when the host should re-render.
    #[wasm_bindgen(js_name = "onFrame")]
    pub fn on_frame(&mut self) -> bool {
        self.epg.on_frame(now_ms())
    }

    #[wasm_bindgen(js_name = "nextDeadline")]
    pub fn next_deadline(&self) -> Option<f64> {
        self.epg.next_deadline()
    }

    /// Visible frame as plain JSON.
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        let frame = self.epg.render(&mut SnapshotRenderer, local_now()?);
        Ok(to_js(&frame)?)
    }

    #[wasm_bindgen(js_name = "mountRow")]
    pub fn mount_row(&mut self, channel_id: &str) -> Result<JsValue, JsValue> {
        let request = self.epg.mount_row(channel_id, local_now()?);
        Ok(request_to_js(request)?)
    }

    #[wasm_bindgen(js_name = "unmountRow")]
    pub fn unmount_row(&mut self, channel_id: &str) -> bool {
        self.epg.unmount_row(channel_id)
    }

    /// `data-state` value of a mounted row, `undefined` in the middle.
    #[wasm_bindgen(js_name = "rowState")]
    pub fn row_state(&self, channel_id: &str) -> Option<String> {
        self.epg
            .row(channel_id)
            .and_then(|row| row.boundary().as_attribute())
            .map(str::to_string)
    }

    #[wasm_bindgen(js_name = "initialScroll")]
    pub fn initial_scroll(&mut self) -> Result<JsValue, JsValue> {
        let request = self.epg.initial_scroll(local_now()?);
        Ok(request_to_js(request)?)
    }

    /// Page command without `channelId`, row command with it.
    #[wasm_bindgen(js_name = "scrollToNow")]
    pub fn scroll_to_now(&mut self, channel_id: Option<String>) -> Result<JsValue, JsValue> {
        let now = local_now()?;
        let request = self.epg.scroll_to_now(surface(channel_id.as_deref()), now);
        Ok(request_to_js(request)?)
    }

    #[wasm_bindgen(js_name = "scrollTop")]
    pub fn scroll_top(&mut self, delta: Option<f64>) -> Result<JsValue, JsValue> {
        Ok(to_js(&self.epg.scroll_top(delta))?)
    }

    #[wasm_bindgen(js_name = "scrollLeft")]
    pub fn scroll_left(
        &mut self,
        channel_id: Option<String>,
        delta: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        let request = self
            .epg
            .scroll_left(surface(channel_id.as_deref()), delta, now_ms());
        Ok(request_to_js(request)?)
    }

    #[wasm_bindgen(js_name = "scrollRight")]
    pub fn scroll_right(
        &mut self,
        channel_id: Option<String>,
        delta: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        let request = self
            .epg
            .scroll_right(surface(channel_id.as_deref()), delta, now_ms());
        Ok(request_to_js(request)?)
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(
        &mut self,
        channel_id: Option<String>,
        left: f64,
        smooth: bool,
    ) -> Result<JsValue, JsValue> {
        let behavior = if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        };
        let request = self
            .epg
            .scroll_to(surface(channel_id.as_deref()), left, behavior);
        Ok(request_to_js(request)?)
    }

    #[wasm_bindgen(getter, js_name = "contentWidth")]
    pub fn content_width(&self) -> f64 {
        self.epg.content_width()
    }

    #[wasm_bindgen(getter, js_name = "contentHeight")]
    pub fn content_height(&self) -> f64 {
        self.epg.content_height()
    }
}
