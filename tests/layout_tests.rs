//! Layout feature tests for epgview
//!
//! Tests for time to pixel conversion, program and channel positioning,
//! run indices of paged placement, and per-channel rows.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_lossless
)]

mod fixtures;

use chrono::Duration;
use fixtures::{channel, channels, day_window, dt, hourly, program};
use epgview::layout::units::pixel_offset;
use epgview::layout::{
    build_channel_position, build_program_position, convert_programs, ConvertParams,
    DayWidthResources, ProgramGeometry, TimeWindow,
};
use epgview::types::{FieldKeys, Program};
use quickcheck_macros::quickcheck;
use serde_json::json;
use test_case::test_case;

const HOUR_WIDTH: f64 = 100.0;

fn geometry(window: &TimeWindow, channel_index: Option<usize>) -> ProgramGeometry<'_> {
    ProgramGeometry {
        channel_index,
        item_index: 0,
        item_width: None,
        item_height: 80.0,
        hour_width: HOUR_WIDTH,
        window,
        row_offset_top: 0.0,
    }
}

fn params<'a>(window: &'a TimeWindow, keys: &'a FieldKeys, row_mode: bool) -> ConvertParams<'a> {
    ConvertParams {
        window,
        item_width: row_mode.then_some(150.0),
        item_height: 80.0,
        hour_width: HOUR_WIDTH,
        row_offset_top: 0.0,
        row_mode,
        keys,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_program_inside_window() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = program("ch0", "2024-01-01T01:00:00", "2024-01-01T03:00:00");
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert_eq!(item.position.top, 0.0);
    assert_eq!(item.position.left, 100.0);
    assert_eq!(item.position.width, 200.0);
    assert_eq!(item.position.edge_end, 300.0);
    assert_eq!(item.position.height, 80.0);
}

#[test]
fn test_program_spanning_window_start() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = program("ch0", "2023-12-31T23:00:00", "2024-01-01T01:00:00");
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert_eq!(item.position.left, 0.0);
    assert_eq!(item.position.width, 100.0);
    assert_eq!(item.position.edge_end, 100.0);
}

#[test]
fn test_program_before_window_has_no_width() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = program("ch0", "2023-12-31T20:00:00", "2023-12-31T22:00:00");
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert!(item.position.width <= 0.0);
}

#[test]
fn test_program_past_window_end_is_clipped() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = program("ch0", "2024-01-01T23:00:00", "2024-01-02T02:00:00");
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert_eq!(item.position.left, 2300.0);
    assert_eq!(item.position.width, 100.0);
    assert_eq!(item.position.edge_end, 2400.0);
}

#[test]
fn test_missing_till_defaults_to_end_of_day() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = Program::from(json!({"channelUuid": "ch0", "since": "2024-01-01T22:00:00"}));
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert_eq!(item.data.get("till"), Some(&json!("2024-01-01T23:59:59")));
    assert_eq!(item.position.width, 200.0);
}

#[test]
fn test_missing_till_runs_until_next_program() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = Program::from(json!({"channelUuid": "ch0", "since": "2024-01-01T10:00:00"}));
    let next = program("ch0", "2024-01-01T10:30:00", "2024-01-01T11:00:00");
    let item = build_program_position(&p, Some(&next), &geometry(&window, Some(0)), &keys);
    assert_eq!(item.position.width, 50.0);
    assert_eq!(item.data.get("till"), Some(&json!("2024-01-01T10:30:00")));
}

#[test]
fn test_unreadable_since_is_degenerate() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = Program::from(json!({"channelUuid": "ch0", "since": "soon", "till": "later"}));
    let item = build_program_position(&p, None, &geometry(&window, Some(2)), &keys);
    assert_eq!(item.position.width, 0.0);
    assert_eq!(item.position.edge_end, 0.0);
    assert_eq!(item.position.top, 160.0);
    assert_eq!(item.data, p);
}

#[test]
fn test_epoch_millis_and_custom_keys() {
    let window = day_window();
    let keys = FieldKeys {
        program_channel: "station".into(),
        since: "start".into(),
        till: "stop".into(),
        ..FieldKeys::default()
    };
    // 2024-01-01T02:00:00Z and 2024-01-01T04:00:00Z
    let p = Program::from(json!({"station": 7, "start": 1_704_074_400_000_i64, "stop": 1_704_081_600_000_i64}));
    let item = build_program_position(&p, None, &geometry(&window, Some(0)), &keys);
    assert_eq!(item.position.left, 200.0);
    assert_eq!(item.position.width, 200.0);
    assert_eq!(item.data.get("start"), Some(&json!("2024-01-01T02:00:00")));
}

#[test]
fn test_placeholder_block() {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = Program::from(json!({"channelUuid": "ch0", "isEmpty": true}));
    let item = build_program_position(&p, None, &geometry(&window, Some(1)), &keys);
    assert_eq!(item.position.left, 0.0);
    assert_eq!(item.position.width, 200.0);
    assert_eq!(item.position.top, 80.0);
}

#[test_case(0, 1, 1 ; "first program of the run")]
#[test_case(3, 4, 4 ; "fourth program of the run")]
fn test_fixed_width_placement(item_index: usize, from_hour: u32, to_hour: u32) {
    let window = day_window();
    let keys = FieldKeys::default();
    let p = program(
        "ch0",
        &format!("2024-01-01T{from_hour:02}:00:00"),
        &format!("2024-01-01T{:02}:00:00", to_hour + 1),
    );
    let g = ProgramGeometry {
        item_index,
        item_width: Some(150.0),
        ..geometry(&window, Some(0))
    };
    let item = build_program_position(&p, None, &g, &keys);
    assert_eq!(item.position.width, 150.0);
    assert_eq!(item.position.left, 150.0 * item_index as f64);
    assert_eq!(item.position.edge_end, 150.0 * (item_index + 1) as f64);
    assert_eq!(item.position.index, Some(item_index));
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_adjacency_index_reset() {
    let window = day_window();
    let keys = FieldKeys::default();
    let programs = vec![
        program("ch1", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
        program("ch1", "2024-01-01T01:00:00", "2024-01-01T02:00:00"),
        program("ch2", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
        program("ch1", "2024-01-01T02:00:00", "2024-01-01T03:00:00"),
    ];
    let layout = convert_programs(
        &programs,
        &[channel("ch1"), channel("ch2")],
        &params(&window, &keys, true),
    );
    let indices: Vec<_> = layout.programs.iter().map(|p| p.position.index).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(0), Some(0)]);
}

#[test]
fn test_row_mode_positions() {
    let window = day_window();
    let keys = FieldKeys::default();
    let list = channels(3);
    let programs = hourly("ch2", 3);
    let layout = convert_programs(&programs, &list, &params(&window, &keys, true));

    let lefts: Vec<_> = layout.programs.iter().map(|p| p.position.left).collect();
    assert_eq!(lefts, vec![0.0, 150.0, 300.0]);

    let rows = layout.programs_by_channel.unwrap();
    let row = &rows["ch2"];
    assert_eq!(row.position.top, build_channel_position(2, 80.0, 0.0).top);
    assert_eq!(row.width, 450.0);
    assert_eq!(row.first_program().unwrap().position.left, 0.0);
    assert_eq!(row.last_program().unwrap().position.left, 300.0);
}

#[test]
fn test_timeline_mode_places_rows_by_channel_order() {
    let window = day_window();
    let keys = FieldKeys::default();
    let mut programs = hourly("ch0", 2);
    programs.extend(hourly("ch1", 2));
    let layout = convert_programs(&programs, &channels(2), &params(&window, &keys, false));
    let tops: Vec<_> = layout.programs.iter().map(|p| p.position.top).collect();
    assert_eq!(tops, vec![0.0, 0.0, 80.0, 80.0]);
    assert!(layout.programs_by_channel.is_none());
}

#[test]
fn test_day_width_resources() {
    let window = TimeWindow::new(dt("2024-01-01T06:00:00"), dt("2024-01-01T18:00:00")).unwrap();
    let resources = DayWidthResources::new(2400.0, &window, None, None);
    assert_eq!(resources.number_of_hours_in_day, 12);
    assert_eq!(resources.hour_width, 200.0);
    assert_eq!(resources.offset_start_hours_range, 6);

    let paged = DayWidthResources::new(2400.0, &window, Some(10), Some(150.0));
    assert_eq!(paged.day_width, 1500.0);
}

// ============================================================================
// Laws
// ============================================================================

#[quickcheck]
fn conversion_is_deterministic(offsets: Vec<u16>) -> bool {
    let window = day_window();
    let keys = FieldKeys::default();
    let programs: Vec<Program> = offsets
        .iter()
        .enumerate()
        .map(|(i, minutes)| {
            let since = window.start() + Duration::minutes(i64::from(*minutes % 2000));
            let till = since + Duration::minutes(30);
            let channel = if i % 3 == 0 { "ch0" } else { "ch1" };
            program(
                channel,
                &since.format("%Y-%m-%dT%H:%M:%S").to_string(),
                &till.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )
        })
        .collect();
    let p = params(&window, &keys, false);
    convert_programs(&programs, &channels(2), &p) == convert_programs(&programs, &channels(2), &p)
}

#[quickcheck]
fn spanning_program_fills_the_window(before: u16, after: u16) -> bool {
    let window = day_window();
    let since = window.start() - Duration::minutes(i64::from(before) + 1);
    let till = window.end() + Duration::minutes(i64::from(after) + 1);
    pixel_offset(since, till, &window, HOUR_WIDTH, None, None) == window.width(HOUR_WIDTH)
}
