//! Presentation hook points.
//!
//! The engine only produces positioned records. A [`RenderStrategy`] turns
//! the visible ones into whatever the host draws (DOM nodes, canvas
//! commands, JSON for a JavaScript view layer). [`SnapshotRenderer`] is the
//! JSON strategy used by the wasm facade.

use serde::Serialize;
use serde_json::{json, Value};

use crate::types::{ChannelRow, PositionedChannel, PositionedProgram};

/// Hour ruler above the content.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRuler {
    pub day_width: f64,
    pub hour_width: f64,
    pub number_of_hours_in_day: u32,
    pub offset_start_hours_range: u32,
    pub sidebar_width: f64,
    pub is_sidebar: bool,
}

impl TimelineRuler {
    /// Hour-of-day label and left offset of every ruler tick.
    pub fn ticks(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        (0..self.number_of_hours_in_day).map(move |i| {
            (
                (self.offset_start_hours_range + i) % 24,
                f64::from(i) * self.hour_width,
            )
        })
    }
}

/// Per-program facts the presentation layer usually wants.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProgramContext {
    /// Currently airing
    pub is_live: bool,
    /// Rendered inside an independently scrolled row
    pub in_row: bool,
}

/// Turns visible records into presentation output.
pub trait RenderStrategy {
    type Output;

    fn program(&mut self, program: &PositionedProgram, context: &ProgramContext) -> Self::Output;

    fn channel(&mut self, channel: &PositionedChannel) -> Self::Output;

    /// Wrap the already rendered visible programs of one row (row mode only).
    fn row(&mut self, channel_id: &str, row: &ChannelRow, programs: Vec<Self::Output>)
        -> Self::Output;

    /// Hour ruler; strategies without one keep the default.
    fn timeline(&mut self, _ruler: &TimelineRuler) -> Option<Self::Output> {
        None
    }
}

/// Visible part of the guide for one render pass.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frame<O> {
    pub timeline: Option<O>,
    pub channels: Vec<O>,
    /// Programs (timeline mode) or rows (row mode)
    pub content: Vec<O>,
    /// Offset of the "now" line, when shown
    pub now_line: Option<f64>,
    pub content_width: f64,
    pub content_height: f64,
}

/// Renders every record to plain JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotRenderer;

impl RenderStrategy for SnapshotRenderer {
    type Output = Value;

    fn program(&mut self, program: &PositionedProgram, context: &ProgramContext) -> Value {
        json!({
            "position": program.position,
            "data": program.data,
            "isLive": context.is_live,
        })
    }

    fn channel(&mut self, channel: &PositionedChannel) -> Value {
        serde_json::to_value(channel).unwrap_or(Value::Null)
    }

    fn row(&mut self, channel_id: &str, row: &ChannelRow, programs: Vec<Value>) -> Value {
        json!({
            "channelId": channel_id,
            "position": row.position,
            "width": row.width,
            "programs": programs,
        })
    }

    fn timeline(&mut self, ruler: &TimelineRuler) -> Option<Value> {
        let ticks: Vec<Value> = ruler
            .ticks()
            .map(|(hour, left)| json!({"hour": hour, "left": left}))
            .collect();
        Some(json!({"ruler": ruler, "ticks": ticks}))
    }
}
