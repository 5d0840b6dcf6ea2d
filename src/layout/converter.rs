//! Conversion of raw channel and program lists into positioned items.
//!
//! Programs must arrive grouped by channel: the run index used for
//! fixed-width placement restarts whenever the array-adjacent predecessor
//! belongs to another channel. Input is never re-sorted.

use std::collections::HashMap;

use super::position::{build_channel_position, build_program_position, ProgramGeometry};
use super::units::TimeWindow;
use crate::types::{
    identity_key, value_key, Channel, ChannelRow, FieldKeys, PositionedChannel, PositionedProgram,
    Program, ProgramsByChannel, RowPosition,
};

/// Scale and mode parameters for a conversion pass.
#[derive(Debug, Clone, Copy)]
pub struct ConvertParams<'a> {
    pub window: &'a TimeWindow,
    pub item_width: Option<f64>,
    pub item_height: f64,
    pub hour_width: f64,
    pub row_offset_top: f64,
    pub row_mode: bool,
    pub keys: &'a FieldKeys,
}

/// Result of [`convert_programs`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramLayout {
    /// Every program in input order.
    pub programs: Vec<PositionedProgram>,
    /// Per-channel rows, only filled in row mode.
    pub programs_by_channel: Option<ProgramsByChannel>,
}

/// Position every program against `channels`.
pub fn convert_programs(
    programs: &[Program],
    channels: &[Channel],
    params: &ConvertParams<'_>,
) -> ProgramLayout {
    let keys = params.keys;
    let channel_rows = index_channels(channels, keys);

    let mut positioned = Vec::with_capacity(programs.len());
    let mut rows = params.row_mode.then(ProgramsByChannel::new);
    let mut item_index = 0usize;
    let mut unmatched = 0usize;

    for (index, program) in programs.iter().enumerate() {
        let channel_ref = program.channel_ref(keys);
        let channel_index =
            channel_ref.and_then(|id| channel_rows.get(&identity_key(id)).copied());
        if channel_index.is_none() {
            unmatched += 1;
        }

        let prev_same = index
            .checked_sub(1)
            .and_then(|prev| programs.get(prev))
            .is_some_and(|prev| prev.same_channel(program, keys));
        item_index = if prev_same { item_index + 1 } else { 0 };

        let next_program = programs
            .get(index + 1)
            .filter(|next| next.same_channel(program, keys));

        let geometry = ProgramGeometry {
            channel_index,
            item_index,
            item_width: params.item_width,
            item_height: params.item_height,
            hour_width: params.hour_width,
            window: params.window,
            row_offset_top: params.row_offset_top,
        };
        let item = build_program_position(program, next_program, &geometry, keys);

        // Unmatched programs are positioned but never get a row.
        if let (Some(rows), Some(id), Some(channel_index)) =
            (rows.as_mut(), channel_ref, channel_index)
        {
            let top =
                build_channel_position(channel_index, params.item_height, params.row_offset_top).top;
            let row = rows.entry(value_key(id)).or_insert_with(|| ChannelRow {
                position: RowPosition { top },
                programs: Vec::new(),
                width: 0.0,
            });
            row.width = row.width.max(item.position.edge_end);
            row.programs.push(item.clone());
        }

        positioned.push(item);
    }

    if unmatched > 0 {
        tracing::warn!(unmatched, "programs reference channels missing from the channel list");
    }
    tracing::debug!(
        programs = positioned.len(),
        channels = channels.len(),
        rows = rows.as_ref().map_or(0, |r| r.len()),
        "converted programs"
    );

    ProgramLayout {
        programs: positioned,
        programs_by_channel: rows,
    }
}

/// Attach a row slot to every channel, preserving order.
pub fn convert_channels(
    channels: &[Channel],
    item_height: f64,
    row_offset_top: f64,
) -> Vec<PositionedChannel> {
    channels
        .iter()
        .enumerate()
        .map(|(index, channel)| PositionedChannel {
            position: build_channel_position(index, item_height, row_offset_top),
            data: channel.clone(),
        })
        .collect()
}

/// First row index of every channel identifier, keyed by [`identity_key`].
fn index_channels(channels: &[Channel], keys: &FieldKeys) -> HashMap<String, usize> {
    let mut rows = HashMap::with_capacity(channels.len());
    for (index, channel) in channels.iter().enumerate() {
        if let Some(id) = channel.id(keys) {
            rows.entry(identity_key(id)).or_insert(index);
        }
    }
    rows
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

    fn window() -> TimeWindow {
        TimeWindow::new(
            parse_date("2024-01-01T00:00:00").unwrap(),
            parse_date("2024-01-02T00:00:00").unwrap(),
        )
        .unwrap()
    }

    fn channel(id: &str) -> Channel {
        Channel::from(json!({"uuid": id, "logo": format!("{id}.png")}))
    }

    fn program(channel: &str, since: &str, till: &str) -> Program {
        Program::from(json!({"channelUuid": channel, "since": since, "till": till}))
    }

    #[test]
    fn test_run_index_resets_on_channel_change() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: Some(100.0),
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 0.0,
            row_mode: false,
            keys: &keys,
        };
        let programs = vec![
            program("ch1", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
            program("ch1", "2024-01-01T01:00:00", "2024-01-01T02:00:00"),
            program("ch2", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
            program("ch1", "2024-01-01T02:00:00", "2024-01-01T03:00:00"),
        ];
        let layout = convert_programs(&programs, &[channel("ch1"), channel("ch2")], &params);
        let indices: Vec<_> = layout
            .programs
            .iter()
            .map(|p| p.position.index.unwrap())
            .collect();
        assert_eq!(indices, vec![0, 1, 0, 0]);
        assert!(layout.programs_by_channel.is_none());
    }

    #[test]
    fn test_next_program_only_within_channel() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: None,
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 0.0,
            row_mode: false,
            keys: &keys,
        };
        let programs = vec![
            Program::from(json!({"channelUuid": "ch1", "since": "2024-01-01T20:00:00"})),
            Program::from(json!({"channelUuid": "ch2", "since": "2024-01-01T21:00:00"})),
        ];
        let layout = convert_programs(&programs, &[channel("ch1"), channel("ch2")], &params);
        // Next program belongs to another channel, so the slot runs to the end of the day.
        assert_eq!(
            layout.programs[0].data.get("till"),
            Some(&json!("2024-01-01T23:59:59"))
        );
        assert_eq!(layout.programs[1].position.top, 80.0);
    }

    #[test]
    fn test_unmatched_channel() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: None,
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 0.0,
            row_mode: false,
            keys: &keys,
        };
        let programs = vec![program("ghost", "2024-01-01T01:00:00", "2024-01-01T02:00:00")];
        let layout = convert_programs(&programs, &[channel("ch1")], &params);
        assert_eq!(layout.programs[0].position.width, 0.0);
        assert_eq!(layout.programs[0].position.top, -80.0);
    }

    #[test]
    fn test_unmatched_programs_get_no_row() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: Some(150.0),
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 0.0,
            row_mode: true,
            keys: &keys,
        };
        let programs = vec![
            program("ghost", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
            program("ghost", "2024-01-01T01:00:00", "2024-01-01T02:00:00"),
            program("ch1", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
        ];
        let layout = convert_programs(&programs, &[channel("ch1")], &params);
        let rows = layout.programs_by_channel.unwrap();
        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["ch1"]);
        assert_eq!(layout.programs.len(), 3);
        assert_eq!(layout.programs[1].position.width, 0.0);
    }

    #[test]
    fn test_numeric_and_string_ids_are_distinct_channels() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: Some(150.0),
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 0.0,
            row_mode: true,
            keys: &keys,
        };
        let programs = vec![
            Program::from(json!({"channelUuid": 7, "since": "2024-01-01T00:00:00"})),
            Program::from(json!({"channelUuid": 7, "since": "2024-01-01T01:00:00"})),
            Program::from(json!({"channelUuid": "7", "since": "2024-01-01T02:00:00"})),
        ];
        let channels = [Channel::from(json!({"uuid": 7}))];
        let layout = convert_programs(&programs, &channels, &params);

        let placed: Vec<_> = layout
            .programs
            .iter()
            .map(|p| (p.position.top, p.position.left, p.position.index.unwrap()))
            .collect();
        assert_eq!(placed, vec![(0.0, 0.0, 0), (0.0, 150.0, 1), (-80.0, 0.0, 0)]);
        assert_eq!(layout.programs[2].position.width, 0.0);
        assert_eq!(layout.programs_by_channel.unwrap()["7"].programs.len(), 2);
    }

    #[test]
    fn test_row_mode_groups_by_channel() {
        let w = window();
        let keys = FieldKeys::default();
        let params = ConvertParams {
            window: &w,
            item_width: Some(150.0),
            item_height: 80.0,
            hour_width: 100.0,
            row_offset_top: 8.0,
            row_mode: true,
            keys: &keys,
        };
        let programs = vec![
            program("ch2", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
            program("ch2", "2024-01-01T01:00:00", "2024-01-01T02:00:00"),
            program("ch1", "2024-01-01T00:00:00", "2024-01-01T01:00:00"),
        ];
        let layout = convert_programs(&programs, &[channel("ch1"), channel("ch2")], &params);
        let rows = layout.programs_by_channel.unwrap();
        let keys: Vec<_> = rows.keys().cloned().collect();
        assert_eq!(keys, vec!["ch2".to_string(), "ch1".to_string()]);
        assert_eq!(rows["ch2"].position.top, 88.0);
        assert_eq!(rows["ch2"].programs.len(), 2);
        assert_eq!(rows["ch2"].width, 300.0);
        assert_eq!(rows["ch1"].position.top, 0.0);
    }

    #[test]
    fn test_convert_channels() {
        let channels = vec![channel("a"), channel("b"), channel("c")];
        let converted = convert_channels(&channels, 70.0, 0.0);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[2].position.top, 140.0);
        assert_eq!(converted[2].position.height, 70.0);
        assert_eq!(converted[1].data, channels[1]);
    }
}
