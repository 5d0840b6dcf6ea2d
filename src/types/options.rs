use serde::{Deserialize, Serialize};

use super::keys::FieldKeys;
use crate::error::{EpgError, Result};

/// Default width of a full day in pixels
pub const DAY_WIDTH: f64 = 7200.0;
/// Default channel sidebar width in pixels
pub const SIDEBAR_WIDTH: f64 = 200.0;
/// Default row height in pixels
pub const ITEM_HEIGHT: f64 = 80.0;
/// Default overscan margin in pixels
pub const ITEM_OVERSCAN: f64 = 20.0;
/// Default timeline (hour ruler) height in pixels
pub const TIMELINE_HEIGHT: f64 = 64.0;
/// Default scroll debounce wait (ms)
pub const DEBOUNCE_WAIT: f64 = 20.0;
/// Default scroll debounce ceiling (ms)
pub const DEBOUNCE_WAIT_MAX: f64 = 60.0;
/// Default give-up time for animated scroll completion (ms)
pub const SCROLL_TIMEOUT: f64 = 1000.0;

/// Guide configuration as supplied by the host.
///
/// Every field is optional in the serialized form; omitted fields take the
/// defaults above.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EpgOptions {
    /// Window start (`YYYY-MM-DDTHH:MM:SS`); start of today when absent
    pub start_date: Option<String>,
    /// Window end; end of the start day when absent or empty
    pub end_date: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub day_width: f64,
    pub sidebar_width: f64,
    /// Fixed item width; switches the guide to paged placement
    pub item_width: Option<f64>,
    pub item_height: f64,
    pub item_overscan: f64,
    pub timeline_height: f64,
    /// Number of fixed-width items per row, used to size the content
    pub max_length: Option<usize>,
    /// Extra vertical space per row (row mode scrollbar thickness)
    pub row_offset_top: f64,
    pub is_row: bool,
    pub is_sidebar: bool,
    pub is_timeline: bool,
    pub is_line: bool,
    pub is_scroll_to_now: bool,
    pub debounce_wait: f64,
    pub debounce_max_wait: f64,
    pub scroll_timeout_ms: f64,
    #[serde(flatten)]
    pub keys: FieldKeys,
}

impl Default for EpgOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            width: None,
            height: None,
            day_width: DAY_WIDTH,
            sidebar_width: SIDEBAR_WIDTH,
            item_width: None,
            item_height: ITEM_HEIGHT,
            item_overscan: ITEM_OVERSCAN,
            timeline_height: TIMELINE_HEIGHT,
            max_length: None,
            row_offset_top: 0.0,
            is_row: false,
            is_sidebar: true,
            is_timeline: true,
            is_line: true,
            is_scroll_to_now: false,
            debounce_wait: DEBOUNCE_WAIT,
            debounce_max_wait: DEBOUNCE_WAIT_MAX,
            scroll_timeout_ms: SCROLL_TIMEOUT,
            keys: FieldKeys::default(),
        }
    }
}

impl EpgOptions {
    /// Parse options from a JSON string.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject scale values that would make the geometry meaningless.
    ///
    /// # Errors
    /// Returns [`EpgError::InvalidOptions`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        positive("dayWidth", self.day_width)?;
        positive("itemHeight", self.item_height)?;
        non_negative("itemOverscan", self.item_overscan)?;
        non_negative("sidebarWidth", self.sidebar_width)?;
        non_negative("rowOffsetTop", self.row_offset_top)?;
        non_negative("debounceWait", self.debounce_wait)?;
        non_negative("debounceMaxWait", self.debounce_max_wait)?;
        if let Some(width) = self.item_width {
            positive("itemWidth", width)?;
        }
        Ok(())
    }

    /// Fixed item width when paged placement is active.
    pub fn fixed_item_width(&self) -> Option<f64> {
        self.item_width.filter(|w| *w > 0.0)
    }

    /// Timeline ruler is hidden in paged placement.
    pub fn timeline_enabled(&self) -> bool {
        self.is_timeline && self.fixed_item_width().is_none()
    }

    /// Now-line is hidden in paged placement.
    pub fn line_enabled(&self) -> bool {
        self.is_line && self.fixed_item_width().is_none()
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EpgError::InvalidOptions(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EpgError::InvalidOptions(format!(
            "{field} must be zero or positive, got {value}"
        )))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options = EpgOptions::from_json("{}").unwrap();
        assert_eq!(options, EpgOptions::default());
        assert_eq!(options.item_height, ITEM_HEIGHT);
        assert_eq!(options.keys.since, "since");
    }

    #[test]
    fn test_camel_case_and_flattened_keys() {
        let options = EpgOptions::from_json(
            r#"{"itemWidth":150,"isRow":true,"rowOffsetTop":12,"channelMapKey":"id"}"#,
        )
        .unwrap();
        assert_eq!(options.item_width, Some(150.0));
        assert!(options.is_row);
        assert_eq!(options.row_offset_top, 12.0);
        assert_eq!(options.keys.channel, "id");
        assert!(!options.timeline_enabled());
        assert!(!options.line_enabled());
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let err = EpgOptions::from_json(r#"{"itemHeight":0}"#).unwrap_err();
        assert!(matches!(err, EpgError::InvalidOptions(_)));
        assert!(err.to_string().contains("itemHeight"));

        let err = EpgOptions::from_json(r#"{"itemOverscan":-1}"#).unwrap_err();
        assert!(err.to_string().contains("itemOverscan"));
    }
}
