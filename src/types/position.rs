use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::record::{Channel, Program};

/// Rectangle of a program block in content coordinates (post-sidebar).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub left: f64,
    /// Right pixel boundary of the time span. Differs from `left + width`
    /// when the block is clipped at the window edge.
    pub edge_end: f64,
    /// Index within the contiguous same-channel run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Vertical slot of a channel row.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPosition {
    pub top: f64,
    pub height: f64,
}

/// A program paired with its computed rectangle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PositionedProgram {
    pub position: Position,
    pub data: Program,
}

/// A channel paired with its row slot. The source record is copied, never mutated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PositionedChannel {
    pub position: ChannelPosition,
    #[serde(flatten)]
    pub data: Channel,
}

/// Top offset of a row in row mode.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct RowPosition {
    pub top: f64,
}

/// Programs of one channel in row mode.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChannelRow {
    pub position: RowPosition,
    pub programs: Vec<PositionedProgram>,
    /// Largest `edge_end` of the row's programs, i.e. its scrollable width.
    pub width: f64,
}

impl ChannelRow {
    pub fn first_program(&self) -> Option<&PositionedProgram> {
        self.programs.first()
    }

    pub fn last_program(&self) -> Option<&PositionedProgram> {
        self.programs.last()
    }
}

/// Rows keyed by channel identifier, in first-seen order.
pub type ProgramsByChannel = IndexMap<String, ChannelRow>;
