//! Mount decision tests for programs, sidebar channels and the viewport.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod fixtures;

use epgview::layout::{
    is_program_visible, is_sidebar_item_visible, Viewport, VisibilityOverrides,
};
use epgview::types::Position;
use epgview::{Epg, EpgOptions};
use fixtures::{channels, hourly, today};
use quickcheck_macros::quickcheck;
use test_case::test_case;

fn block(top: f64, left: f64, width: f64) -> Position {
    Position {
        width,
        height: 80.0,
        top,
        left,
        edge_end: left + width,
        index: None,
    }
}

#[test_case(0.0, 0.0, true ; "in view")]
#[test_case(0.0, 360.0, true ; "still inside the overscan margin")]
#[test_case(0.0, 361.0, false ; "scrolled far past")]
#[test_case(600.0, 0.0, false ; "below the fold")]
#[test_case(599.0, 0.0, true ; "last pixel row")]
fn test_vertical_culling(top: f64, scroll_y: f64, expected: bool) {
    let position = block(top, 0.0, 100.0);
    assert_eq!(
        is_program_visible(&position, scroll_y, 0.0, 600.0, 800.0, 120.0, None),
        expected
    );
}

#[test_case(0.0, 100.0, 0.0, true ; "at origin")]
#[test_case(900.0, 100.0, 100.0, true ; "left edge at viewport right edge")]
#[test_case(901.0, 100.0, 100.0, false ; "right of viewport")]
#[test_case(0.0, 100.0, 100.0, true ; "edge end at viewport left edge")]
#[test_case(0.0, 100.0, 101.0, false ; "left of viewport")]
fn test_horizontal_culling(left: f64, width: f64, scroll_x: f64, expected: bool) {
    let position = block(0.0, left, width);
    assert_eq!(
        is_program_visible(&position, 0.0, scroll_x, 600.0, 800.0, 20.0, None),
        expected
    );
}

#[test]
fn test_zero_width_only_visible_in_rows() {
    let position = block(0.0, 0.0, 0.0);
    assert!(!is_program_visible(&position, 0.0, 0.0, 600.0, 800.0, 20.0, None));
    let row = VisibilityOverrides::row(0.0, 800.0);
    assert!(is_program_visible(&position, 0.0, 0.0, 600.0, 800.0, 20.0, Some(&row)));
}

#[test]
fn test_row_overrides_replace_page_scroll() {
    let position = block(0.0, 1500.0, 150.0);
    // Page is at the origin, the row itself is scrolled right.
    assert!(!is_program_visible(&position, 0.0, 0.0, 600.0, 800.0, 20.0, None));
    let row = VisibilityOverrides::row(1000.0, 800.0);
    assert!(is_program_visible(&position, 0.0, 0.0, 600.0, 800.0, 20.0, Some(&row)));
}

#[test]
fn test_viewport_visible_rows_match_sidebar_rule() {
    let mut viewport = Viewport::with_size(800.0, 300.0);
    viewport.set_scroll(0.0, 500.0);
    let (start, end) = viewport.visible_rows(80.0, 50, 20.0);
    for index in 0..50 {
        let top = index as f64 * 80.0;
        assert_eq!(
            (start..end).contains(&index),
            viewport.is_sidebar_item_visible(top, 20.0),
            "row {index}"
        );
    }
    assert_eq!(viewport.visible_rows(80.0, 0, 20.0), (0, 0));
}

#[quickcheck]
fn visibility_never_returns_after_scrolling_past(top: u16, steps: Vec<u16>) -> bool {
    let position = block(f64::from(top), 0.0, 100.0);
    let mut seen_hidden_past = false;
    let mut sorted = steps;
    sorted.sort_unstable();
    for step in sorted {
        let scroll_y = f64::from(step);
        let visible = is_program_visible(&position, scroll_y, 0.0, 600.0, 800.0, 20.0, None);
        let past = scroll_y > position.top + 600.0;
        if past && !visible {
            seen_hidden_past = true;
        }
        if seen_hidden_past && visible {
            return false;
        }
    }
    true
}

#[quickcheck]
fn sidebar_matches_vertical_component(top: i16, scroll_y: u16, left: i16) -> bool {
    let (top, scroll_y) = (f64::from(top), f64::from(scroll_y));
    let position = block(top, f64::from(left), 100.0);
    // A viewport wide enough to contain any horizontal position.
    let program = is_program_visible(&position, scroll_y, -1.0e6, 600.0, 2.0e6, 20.0, None);
    program == is_sidebar_item_visible(top, scroll_y, 600.0, 20.0)
}

#[test]
fn test_programs_of_unknown_channels_never_mount_in_rows() {
    // A wide overscan lets a row one slot above the content pass the sidebar rule.
    let options = EpgOptions {
        start_date: Some(fixtures::START.into()),
        is_row: true,
        item_width: Some(150.0),
        item_overscan: 30.0,
        ..EpgOptions::default()
    };
    let mut programs = hourly("ghost", 3);
    programs.extend(hourly("ch0", 3));
    let epg = Epg::new(options, channels(1), programs, today()).unwrap();

    let rows: Vec<_> = epg.visible_rows().into_iter().map(|(id, _)| id).collect();
    assert_eq!(rows, vec!["ch0"]);
    assert!(epg.row_visible_programs("ghost").is_empty());
    assert!(epg
        .programs()
        .iter()
        .filter(|p| p.position.top < 0.0)
        .all(|p| p.position.width == 0.0));
}
