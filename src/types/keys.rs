use serde::{Deserialize, Serialize};

/// Default channel identifier field.
pub const DEFAULT_CHANNEL_KEY: &str = "uuid";
/// Default channel logo field.
pub const DEFAULT_LOGO_KEY: &str = "logo";
/// Default program field referencing its channel.
pub const DEFAULT_PROGRAM_CHANNEL_KEY: &str = "channelUuid";
/// Default program start field.
pub const DEFAULT_SINCE_KEY: &str = "since";
/// Default program end field.
pub const DEFAULT_TILL_KEY: &str = "till";
/// Placeholder flag on filler programs. Not configurable.
pub const IS_EMPTY_KEY: &str = "isEmpty";

/// Field names used to read channel and program records.
///
/// Resolved once per conversion so heterogeneous record shapes plug in
/// without adapters. Serialized names match the JavaScript options object
/// (`channelMapKey`, `sinceMapKey`, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FieldKeys {
    #[serde(rename = "channelMapKey")]
    pub channel: String,
    #[serde(rename = "logoChannelMapKey")]
    pub logo: String,
    #[serde(rename = "programChannelMapKey")]
    pub program_channel: String,
    #[serde(rename = "sinceMapKey")]
    pub since: String,
    #[serde(rename = "tillMapKey")]
    pub till: String,
}

impl Default for FieldKeys {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL_KEY.to_string(),
            logo: DEFAULT_LOGO_KEY.to_string(),
            program_channel: DEFAULT_PROGRAM_CHANNEL_KEY.to_string(),
            since: DEFAULT_SINCE_KEY.to_string(),
            till: DEFAULT_TILL_KEY.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let keys: FieldKeys =
            serde_json::from_str(r#"{"sinceMapKey":"start","tillMapKey":"end"}"#).unwrap();
        assert_eq!(keys.since, "start");
        assert_eq!(keys.till, "end");
        assert_eq!(keys.channel, DEFAULT_CHANNEL_KEY);
        assert_eq!(keys.program_channel, DEFAULT_PROGRAM_CHANNEL_KEY);
    }
}
