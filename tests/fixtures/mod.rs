//! Record builders shared by the integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use chrono::{NaiveDate, NaiveDateTime};
use epgview::layout::units::parse_date;
use epgview::layout::TimeWindow;
use epgview::types::{Channel, Program};
use serde_json::json;

pub const START: &str = "2024-01-01T00:00:00";
pub const END: &str = "2024-01-02T00:00:00";

pub fn dt(s: &str) -> NaiveDateTime {
    parse_date(s).unwrap()
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// The 24 hour window of 2024-01-01.
pub fn day_window() -> TimeWindow {
    TimeWindow::new(dt(START), dt(END)).unwrap()
}

pub fn channel(id: &str) -> Channel {
    Channel::from(json!({"uuid": id, "logo": format!("https://cdn.example/{id}.png")}))
}

pub fn channels(n: usize) -> Vec<Channel> {
    (0..n).map(|i| channel(&format!("ch{i}"))).collect()
}

pub fn program(channel: &str, since: &str, till: &str) -> Program {
    Program::from(json!({
        "channelUuid": channel,
        "title": format!("{channel} {since}"),
        "since": since,
        "till": till,
    }))
}

/// `count` back-to-back one hour programs from midnight.
pub fn hourly(channel: &str, count: u32) -> Vec<Program> {
    (0..count.min(23))
        .map(|h| {
            program(
                channel,
                &format!("2024-01-01T{h:02}:00:00"),
                &format!("2024-01-01T{:02}:00:00", h + 1),
            )
        })
        .collect()
}
