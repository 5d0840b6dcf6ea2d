//! Benchmarks for program conversion and visibility culling.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use epgview::layout::units::parse_date;
use epgview::layout::{convert_programs, ConvertParams, TimeWindow};
use epgview::types::{Channel, FieldKeys, Program};
use epgview::{Epg, EpgOptions, Surface};
use serde_json::json;

/// `channels` channels with 48 half-hour programs each.
fn guide_data(channels: usize) -> (Vec<Channel>, Vec<Program>) {
    let channel_list = (0..channels)
        .map(|i| Channel::from(json!({"uuid": format!("ch{i}"), "logo": "logo.png"})))
        .collect();
    let mut programs = Vec::with_capacity(channels * 48);
    for i in 0..channels {
        for slot in 0..48u32 {
            let (h, m) = (slot / 2, (slot % 2) * 30);
            let (th, tm) = ((slot + 1) / 2, ((slot + 1) % 2) * 30);
            let till = if th == 24 {
                "2024-01-01T23:59:59".to_string()
            } else {
                format!("2024-01-01T{th:02}:{tm:02}:00")
            };
            programs.push(Program::from(json!({
                "channelUuid": format!("ch{i}"),
                "title": format!("Program {slot}"),
                "since": format!("2024-01-01T{h:02}:{m:02}:00"),
                "till": till,
            })));
        }
    }
    (channel_list, programs)
}

/// Benchmark conversion of guides of increasing size
fn bench_convert(c: &mut Criterion) {
    let window = TimeWindow::new(
        parse_date("2024-01-01T00:00:00").expect("start"),
        parse_date("2024-01-02T00:00:00").expect("end"),
    )
    .expect("window");
    let keys = FieldKeys::default();

    let mut group = c.benchmark_group("convert_programs");
    for channels in [50usize, 200, 1000] {
        let (channel_list, programs) = guide_data(channels);
        group.throughput(Throughput::Elements(programs.len() as u64));
        for row_mode in [false, true] {
            let params = ConvertParams {
                window: &window,
                item_width: row_mode.then_some(200.0),
                item_height: 80.0,
                hour_width: 300.0,
                row_offset_top: 0.0,
                row_mode,
                keys: &keys,
            };
            let label = if row_mode { "rows" } else { "timeline" };
            group.bench_with_input(BenchmarkId::new(label, channels), &programs, |b, programs| {
                b.iter(|| convert_programs(black_box(programs), &channel_list, &params))
            });
        }
    }
    group.finish();
}

/// Benchmark the visible set after a committed scroll
fn bench_visible(c: &mut Criterion) {
    let (channels, programs) = guide_data(1000);
    let options = EpgOptions {
        start_date: Some("2024-01-01T00:00:00".into()),
        width: Some(1280.0),
        height: Some(720.0),
        debounce_wait: 0.0,
        debounce_max_wait: 0.0,
        ..EpgOptions::default()
    };
    let today = parse_date("2024-01-01T00:00:00").expect("today").date();
    let mut epg = Epg::new(options, channels, programs, today).expect("guide");
    epg.on_scroll(Surface::Page, 3000.0, 40_000.0, 0.0);
    epg.on_frame(1.0);

    c.bench_function("visible_programs_1000x48", |b| {
        b.iter(|| black_box(epg.visible_programs().len()))
    });
    c.bench_function("visible_channels_1000", |b| {
        b.iter(|| black_box(epg.visible_channels().len()))
    });
}

criterion_group!(benches, bench_convert, bench_visible);
criterion_main!(benches);
