//! Time to pixel conversion.
//!
//! Horizontal geometry is a linear map from minutes to pixels at a fixed
//! hour width, measured from the window start. Items crossing either window
//! edge are clamped to it; fixed-width placement bypasses time entirely.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde_json::Value;

use crate::error::{EpgError, Result};

/// Minutes per hour
pub const HOUR_IN_MINUTES: f64 = 60.0;

/// Serialized form used for normalized program times.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const PARSE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Visible date range. All horizontal positions are relative to `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeWindow {
    /// Create a window.
    ///
    /// # Errors
    /// Returns [`EpgError::InvalidDate`] if `end` precedes `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(EpgError::InvalidDate(format!(
                "window end {} precedes start {}",
                format_time(end),
                format_time(start)
            )));
        }
        Ok(Self { start, end })
    }

    /// Resolve host-supplied bounds. A missing start means the start of
    /// `today`; a missing or empty end means the end of the start day.
    ///
    /// # Errors
    /// Returns an error if a bound cannot be parsed or the range is inverted.
    pub fn from_inputs(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Result<Self> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s)?,
            None => today.and_time(NaiveTime::MIN),
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s)?,
            None => end_of_day(start),
        };
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whole minutes covered by the window (end rounded to the minute).
    pub fn minutes(&self) -> i64 {
        minutes_between(round_to_minutes(self.end), self.start)
    }

    /// Full pixel width of the window at the given scale.
    pub fn width(&self, hour_width: f64) -> f64 {
        minutes_to_pixels(self.minutes(), hour_width)
    }

    /// True when the window starts on `date`.
    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.date() == date
    }

    /// True while the window has not fully elapsed at `now`.
    pub fn is_future(&self, now: NaiveDateTime) -> bool {
        self.end > now
    }

    /// Horizontal offset of an instant inside the window.
    pub fn offset_of(&self, instant: NaiveDateTime, hour_width: f64) -> f64 {
        pixel_offset(self.start, instant, self, hour_width, None, None)
    }
}

/// Width derived quantities of the window, as needed by the timeline ruler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWidthResources {
    pub day_width: f64,
    pub hour_width: f64,
    pub number_of_hours_in_day: u32,
    pub offset_start_hours_range: u32,
}

impl DayWidthResources {
    pub fn new(
        day_width: f64,
        window: &TimeWindow,
        max_length: Option<usize>,
        item_width: Option<f64>,
    ) -> Self {
        let minutes = window.minutes().max(1);
        let hours = u32::try_from((minutes + 59) / 60).unwrap_or(u32::MAX).max(1);
        let day_width = match (item_width.filter(|w| *w > 0.0), max_length) {
            (Some(width), Some(length)) => width * length as f64,
            _ => day_width,
        };
        Self {
            day_width,
            hour_width: day_width / f64::from(hours),
            number_of_hours_in_day: hours,
            offset_start_hours_range: window.start.hour(),
        }
    }
}

/// Pixel length of the interval `since`..`till`, clamped to the window.
///
/// With a fixed `item_width` and an `item_index` the result is simply
/// `item_index * item_width`. Otherwise an interval starting before the
/// window is measured from the window start, one ending after it is measured
/// to the window end, and one doing both spans the full window. A negative
/// length on the end-clamped path yields `0`.
pub fn pixel_offset(
    since: NaiveDateTime,
    till: NaiveDateTime,
    window: &TimeWindow,
    hour_width: f64,
    item_index: Option<usize>,
    item_width: Option<f64>,
) -> f64 {
    if let (Some(width), Some(index)) = (item_width.filter(|w| *w > 0.0), item_index) {
        return width * index as f64;
    }

    let is_tomorrow = till > window.end;
    let is_yesterday = since < window.start;

    let minutes = match (is_yesterday, is_tomorrow) {
        (true, true) => minutes_between(round_to_minutes(window.end), window.start),
        (true, false) => minutes_between(round_to_minutes(till), window.start),
        (false, true) => {
            let diff = minutes_between(round_to_minutes(window.end), round_to_minutes(since));
            if diff < 0 {
                return 0.0;
            }
            diff
        }
        (false, false) => minutes_between(round_to_minutes(till), round_to_minutes(since)),
    };

    minutes_to_pixels(minutes, hour_width)
}

/// Pixels for a duration in minutes.
pub fn minutes_to_pixels(minutes: i64, hour_width: f64) -> f64 {
    minutes as f64 * hour_width / HOUR_IN_MINUTES
}

/// Whole minutes from `earlier` to `later`, truncated toward zero.
pub fn minutes_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    (later - earlier).num_minutes()
}

/// Round to the nearest whole minute (half a minute rounds up).
pub fn round_to_minutes(dt: NaiveDateTime) -> NaiveDateTime {
    let floor = dt
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt);
    if dt.second() >= 30 {
        floor + Duration::minutes(1)
    } else {
        floor
    }
}

/// Last second of the calendar day of `dt`.
pub fn end_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    dt.date().and_time(last)
}

/// Midnight of the calendar day of `dt`.
pub fn start_of_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// Normalized `YYYY-MM-DDTHH:MM:SS` form.
pub fn format_time(dt: NaiveDateTime) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Parse a date string in any of the accepted local or RFC 3339 forms.
///
/// # Errors
/// Returns [`EpgError::InvalidDate`] when no format matches.
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    for format in PARSE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_local());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(EpgError::InvalidDate(input.to_string()))
}

/// Read a record field holding a date string or epoch milliseconds.
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date(s).ok(),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().and_then(float_millis))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn float_millis(value: f64) -> Option<i64> {
    // Bounded to the i64 range before the cast.
    (value.is_finite() && value.abs() < 9.0e18).then(|| value.trunc() as i64)
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
    use serde_json::json;

    fn dt(s: &str) -> NaiveDateTime {
        parse_date(s).unwrap()
    }

    fn day_window() -> TimeWindow {
        TimeWindow::new(dt("2024-01-01T00:00:00"), dt("2024-01-02T00:00:00")).unwrap()
    }

    #[test]
    fn test_inside_window() {
        let w = day_window();
        let width = pixel_offset(
            dt("2024-01-01T01:00:00"),
            dt("2024-01-01T03:00:00"),
            &w,
            100.0,
            None,
            None,
        );
        assert_eq!(width, 200.0);
    }

    #[test]
    fn test_fixed_width_bypasses_time() {
        let w = day_window();
        let since = dt("2030-01-01T00:00:00");
        assert_eq!(pixel_offset(since, since, &w, 100.0, Some(3), Some(150.0)), 450.0);
        assert_eq!(pixel_offset(since, since, &w, 100.0, Some(0), Some(150.0)), 0.0);
    }

    #[test]
    fn test_zero_item_width_falls_back_to_time() {
        let w = day_window();
        let width = pixel_offset(
            dt("2024-01-01T01:00:00"),
            dt("2024-01-01T02:00:00"),
            &w,
            100.0,
            Some(4),
            Some(0.0),
        );
        assert_eq!(width, 100.0);
    }

    #[test]
    fn test_yesterday_clamps_to_start() {
        let w = day_window();
        let width = pixel_offset(
            dt("2023-12-31T23:00:00"),
            dt("2024-01-01T01:00:00"),
            &w,
            100.0,
            None,
            None,
        );
        assert_eq!(width, 100.0);
    }

    #[test]
    fn test_tomorrow_clamps_to_end() {
        let w = day_window();
        let width = pixel_offset(
            dt("2024-01-01T23:00:00"),
            dt("2024-01-02T02:00:00"),
            &w,
            100.0,
            None,
            None,
        );
        assert_eq!(width, 100.0);
    }

    #[test]
    fn test_end_of_day_window_reaches_full_width() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let w = TimeWindow::from_inputs(None, None, today).unwrap();
        assert_eq!(w.end(), dt("2024-01-01T23:59:59"));
        let since = dt("2024-01-01T23:00:00");
        let till = dt("2024-01-02T01:00:00");
        assert_eq!(pixel_offset(since, till, &w, 60.0, None, None), 60.0);
        assert_eq!(pixel_offset(w.start(), till, &w, 60.0, None, None), w.width(60.0));
        assert_eq!(w.width(60.0), 1440.0);
    }

    #[test]
    fn test_both_clamps_give_full_window() {
        let w = day_window();
        let width = pixel_offset(
            dt("2023-12-31T20:00:00"),
            dt("2024-01-03T05:00:00"),
            &w,
            100.0,
            None,
            None,
        );
        assert_eq!(width, w.width(100.0));
        assert_eq!(width, 2400.0);
    }

    #[test]
    fn test_after_window_is_zero_not_negative() {
        let w = day_window();
        let width = pixel_offset(
            dt("2024-01-02T05:00:00"),
            dt("2024-01-02T06:00:00"),
            &w,
            100.0,
            None,
            None,
        );
        assert_eq!(width, 0.0);
    }

    #[test]
    fn test_round_to_minutes() {
        assert_eq!(round_to_minutes(dt("2024-01-01T10:00:29")), dt("2024-01-01T10:00:00"));
        assert_eq!(round_to_minutes(dt("2024-01-01T10:00:30")), dt("2024-01-01T10:01:00"));
        assert_eq!(round_to_minutes(dt("2024-01-01T23:59:59")), dt("2024-01-02T00:00:00"));
    }

    #[test]
    fn test_sub_minute_jitter_is_ignored() {
        let w = day_window();
        let width = pixel_offset(
            dt("2024-01-01T01:00:10"),
            dt("2024-01-01T02:00:20"),
            &w,
            60.0,
            None,
            None,
        );
        assert_eq!(width, 60.0);
    }

    #[test]
    fn test_default_range_is_whole_day() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let w = TimeWindow::from_inputs(None, Some(""), today).unwrap();
        assert_eq!(w.start(), dt("2024-05-06T00:00:00"));
        assert_eq!(w.end(), dt("2024-05-06T23:59:59"));
        assert_eq!(w.minutes(), 24 * 60);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let err = TimeWindow::new(dt("2024-01-02T00:00:00"), dt("2024-01-01T00:00:00"));
        assert!(matches!(err, Err(EpgError::InvalidDate(_))));
    }

    #[test]
    fn test_day_width_resources() {
        let res = DayWidthResources::new(7200.0, &day_window(), None, None);
        assert_eq!(res.number_of_hours_in_day, 24);
        assert_eq!(res.hour_width, 300.0);
        assert_eq!(res.offset_start_hours_range, 0);

        let evening =
            TimeWindow::new(dt("2024-01-01T18:00:00"), dt("2024-01-01T22:30:00")).unwrap();
        let res = DayWidthResources::new(1000.0, &evening, None, None);
        assert_eq!(res.number_of_hours_in_day, 5);
        assert_eq!(res.hour_width, 200.0);
        assert_eq!(res.offset_start_hours_range, 18);

        let paged = DayWidthResources::new(7200.0, &day_window(), Some(10), Some(150.0));
        assert_eq!(paged.day_width, 1500.0);
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = dt("2024-01-01T05:30:00");
        assert_eq!(parse_date("2024-01-01 05:30").unwrap(), expected);
        assert_eq!(parse_date("2024-01-01T05:30:00.000").unwrap(), expected);
        assert_eq!(parse_date("2024-01-01T05:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-01").unwrap(), dt("2024-01-01T00:00:00"));
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn test_parse_date_value() {
        assert_eq!(
            parse_date_value(&json!(1_704_067_200_000_i64)),
            Some(dt("2024-01-01T00:00:00"))
        );
        assert_eq!(
            parse_date_value(&json!("2024-01-01T00:00:00")),
            Some(dt("2024-01-01T00:00:00"))
        );
        assert_eq!(parse_date_value(&json!(true)), None);
    }

    #[test]
    fn test_offset_of_now() {
        let w = day_window();
        assert_eq!(w.offset_of(dt("2024-01-01T12:15:00"), 100.0), 1225.0);
        assert!(w.is_future(dt("2024-01-01T12:15:00")));
        assert!(!w.is_future(dt("2024-01-02T00:00:00")));
    }
}
