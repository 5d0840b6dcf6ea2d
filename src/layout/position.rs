//! Rectangles for individual programs and channel rows.

use chrono::NaiveDateTime;

use super::units::{end_of_day, format_time, parse_date_value, pixel_offset, TimeWindow};
use crate::types::{ChannelPosition, FieldKeys, Position, PositionedProgram, Program};

/// Width given to placeholder blocks when no fixed item width is set.
pub const EMPTY_ITEM_WIDTH: f64 = 200.0;

/// Placement parameters shared by every program of a conversion pass,
/// plus the per-program row and run indices.
#[derive(Debug, Clone, Copy)]
pub struct ProgramGeometry<'a> {
    /// Row of the owning channel; `None` when the channel is not in the list.
    pub channel_index: Option<usize>,
    /// Index within the contiguous same-channel run.
    pub item_index: usize,
    /// Fixed item width (paged placement).
    pub item_width: Option<f64>,
    pub item_height: f64,
    pub hour_width: f64,
    pub window: &'a TimeWindow,
    /// Extra space added to every row.
    pub row_offset_top: f64,
}

impl ProgramGeometry<'_> {
    /// Top of the row; an unmatched channel sits one row above the content.
    pub fn top(&self) -> f64 {
        let row = self.item_height + self.row_offset_top;
        match self.channel_index {
            Some(index) => row * index as f64,
            None => -row,
        }
    }

    fn fixed_width(&self) -> Option<f64> {
        self.item_width.filter(|w| *w > 0.0)
    }
}

/// Vertical slot of the channel at `channel_index`.
pub fn build_channel_position(
    channel_index: usize,
    item_height: f64,
    row_offset_top: f64,
) -> ChannelPosition {
    ChannelPosition {
        top: (item_height + row_offset_top) * channel_index as f64,
        height: item_height,
    }
}

/// Compute the rectangle of `program`.
///
/// `next_program` is the following program of the same channel, if any; it
/// bounds an open-ended program that has no `till`. Placeholder programs get
/// a fixed block at the row start. Programs of unknown channels get zero
/// width so they are culled.
pub fn build_program_position(
    program: &Program,
    next_program: Option<&Program>,
    geometry: &ProgramGeometry<'_>,
    keys: &FieldKeys,
) -> PositionedProgram {
    let top = geometry.top();

    if program.is_empty() {
        let width = geometry.fixed_width().unwrap_or(EMPTY_ITEM_WIDTH);
        return PositionedProgram {
            position: Position {
                width,
                height: geometry.item_height,
                top,
                left: 0.0,
                edge_end: width,
                index: Some(geometry.item_index),
            },
            data: program.clone(),
        };
    }

    let Some(since) = program.since(keys).and_then(parse_date_value) else {
        tracing::warn!(field = %keys.since, "program start is missing or unreadable");
        return PositionedProgram {
            position: Position {
                height: geometry.item_height,
                top,
                index: Some(geometry.item_index),
                ..Position::default()
            },
            data: program.clone(),
        };
    };
    let till = resolve_till(program, next_program, since, keys);

    let window = geometry.window;
    let fixed = geometry.fixed_width();
    let index = geometry.item_index;

    let mut width = fixed.unwrap_or_else(|| {
        pixel_offset(since, till, window, geometry.hour_width, None, None)
    });
    let mut left = pixel_offset(
        window.start(),
        since,
        window,
        geometry.hour_width,
        Some(index),
        geometry.item_width,
    );
    let edge_end = pixel_offset(
        window.start(),
        till,
        window,
        geometry.hour_width,
        Some(index + 1),
        geometry.item_width,
    );

    if fixed.is_none() && since < window.start() {
        left = 0.0;
    }
    if top < 0.0 {
        width = 0.0;
    }

    PositionedProgram {
        position: Position {
            width,
            height: geometry.item_height,
            top,
            left,
            edge_end,
            index: Some(index),
        },
        data: program.with_times(keys, format_time(since), format_time(till)),
    }
}

fn resolve_till(
    program: &Program,
    next_program: Option<&Program>,
    since: NaiveDateTime,
    keys: &FieldKeys,
) -> NaiveDateTime {
    if let Some(raw) = program.till(keys) {
        if let Some(till) = parse_date_value(raw) {
            return till;
        }
        tracing::warn!(field = %keys.till, "program end is unreadable, treating as open-ended");
    }
    next_program
        .and_then(|next| next.since(keys))
        .and_then(parse_date_value)
        .unwrap_or_else(|| end_of_day(since))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::units::parse_date;
    use serde_json::json;

    fn window() -> TimeWindow {
        TimeWindow::new(
            parse_date("2024-01-01T00:00:00").unwrap(),
            parse_date("2024-01-02T00:00:00").unwrap(),
        )
        .unwrap()
    }

    fn geometry(window: &TimeWindow, channel_index: Option<usize>) -> ProgramGeometry<'_> {
        ProgramGeometry {
            channel_index,
            item_index: 0,
            item_width: None,
            item_height: 80.0,
            hour_width: 100.0,
            window,
            row_offset_top: 0.0,
        }
    }

    #[test]
    fn test_program_inside_window() {
        let w = window();
        let program = Program::from(json!({
            "channelUuid": "a",
            "since": "2024-01-01T01:00:00",
            "till": "2024-01-01T03:00:00",
        }));
        let item = build_program_position(&program, None, &geometry(&w, Some(0)), &FieldKeys::default());
        assert_eq!(item.position.top, 0.0);
        assert_eq!(item.position.left, 100.0);
        assert_eq!(item.position.width, 200.0);
        assert_eq!(item.position.edge_end, 300.0);
        assert_eq!(item.position.height, 80.0);
    }

    #[test]
    fn test_program_crossing_window_start() {
        let w = window();
        let program = Program::from(json!({
            "since": "2023-12-31T23:00:00",
            "till": "2024-01-01T01:00:00",
        }));
        let item = build_program_position(&program, None, &geometry(&w, Some(2)), &FieldKeys::default());
        assert_eq!(item.position.left, 0.0);
        assert_eq!(item.position.width, 100.0);
        assert_eq!(item.position.edge_end, 100.0);
        assert_eq!(item.position.top, 160.0);
    }

    #[test]
    fn test_open_ended_program_runs_to_end_of_day() {
        let w = window();
        let program = Program::from(json!({"since": "2024-01-01T22:00:00"}));
        let item = build_program_position(&program, None, &geometry(&w, Some(0)), &FieldKeys::default());
        assert_eq!(item.data.get("till"), Some(&json!("2024-01-01T23:59:59")));
        assert_eq!(item.position.width, 200.0);
    }

    #[test]
    fn test_open_ended_program_runs_to_next_program() {
        let w = window();
        let program = Program::from(json!({"since": "2024-01-01T10:00:00"}));
        let next = Program::from(json!({"since": "2024-01-01T10:30:00"}));
        let item = build_program_position(
            &program,
            Some(&next),
            &geometry(&w, Some(0)),
            &FieldKeys::default(),
        );
        assert_eq!(item.position.width, 50.0);
        assert_eq!(item.data.get("till"), Some(&json!("2024-01-01T10:30:00")));
    }

    #[test]
    fn test_placeholder_program() {
        let w = window();
        let program = Program::from(json!({"isEmpty": true, "since": "garbage"}));
        let item = build_program_position(&program, None, &geometry(&w, Some(1)), &FieldKeys::default());
        assert_eq!(item.position.width, EMPTY_ITEM_WIDTH);
        assert_eq!(item.position.left, 0.0);
        assert_eq!(item.position.edge_end, EMPTY_ITEM_WIDTH);
        assert_eq!(item.position.top, 80.0);

        let mut paged = geometry(&w, Some(1));
        paged.item_width = Some(120.0);
        let item = build_program_position(&program, None, &paged, &FieldKeys::default());
        assert_eq!(item.position.width, 120.0);
        assert_eq!(item.position.edge_end, 120.0);
    }

    #[test]
    fn test_unmatched_channel_has_zero_width() {
        let w = window();
        let program = Program::from(json!({
            "since": "2024-01-01T01:00:00",
            "till": "2024-01-01T03:00:00",
        }));
        let item = build_program_position(&program, None, &geometry(&w, None), &FieldKeys::default());
        assert!(item.position.top < 0.0);
        assert_eq!(item.position.width, 0.0);
    }

    #[test]
    fn test_unreadable_start_is_degenerate() {
        let w = window();
        let program = Program::from(json!({"since": "soon", "till": "2024-01-01T03:00:00"}));
        let item = build_program_position(&program, None, &geometry(&w, Some(0)), &FieldKeys::default());
        assert_eq!(item.position.width, 0.0);
        assert_eq!(item.position.edge_end, 0.0);
        assert_eq!(item.data, program);
    }

    #[test]
    fn test_fixed_width_placement() {
        let w = window();
        let program = Program::from(json!({
            "since": "2023-12-30T01:00:00",
            "till": "2023-12-30T02:00:00",
        }));
        let mut paged = geometry(&w, Some(0));
        paged.item_width = Some(150.0);
        paged.item_index = 2;
        let item = build_program_position(&program, None, &paged, &FieldKeys::default());
        assert_eq!(item.position.width, 150.0);
        // A start before the window does not reset `left` in paged placement;
        // that clamp applies to time placement only.
        assert_eq!(item.position.left, 300.0);
        assert_eq!(item.position.edge_end, 450.0);
        assert_eq!(item.position.index, Some(2));
    }

    #[test]
    fn test_row_offset_top() {
        let w = window();
        let mut g = geometry(&w, Some(3));
        g.row_offset_top = 10.0;
        assert_eq!(g.top(), 270.0);
        assert_eq!(build_channel_position(3, 80.0, 10.0).top, 270.0);
        assert_eq!(build_channel_position(3, 80.0, 10.0).height, 80.0);
    }

    #[test]
    fn test_custom_time_keys() {
        let w = window();
        let keys = FieldKeys {
            since: "start".to_string(),
            till: "stop".to_string(),
            ..FieldKeys::default()
        };
        let program = Program::from(json!({"start": 1_704_070_800_000_i64, "stop": "2024-01-01T02:00"}));
        let item = build_program_position(&program, None, &geometry(&w, Some(0)), &keys);
        assert_eq!(item.position.left, 100.0);
        assert_eq!(item.position.width, 100.0);
        assert_eq!(item.data.get("start"), Some(&json!("2024-01-01T01:00:00")));
    }
}
