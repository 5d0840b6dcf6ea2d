//! Opaque channel and program records.
//!
//! Records are kept as JSON objects so callers can attach arbitrary fields.
//! All field access goes through [`FieldKeys`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::keys::{FieldKeys, IS_EMPTY_KEY};

/// A channel row of the guide.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Channel(pub Map<String, Value>);

/// A scheduled program (or filler block) on a channel.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Program(pub Map<String, Value>);

impl Channel {
    /// Identifier under the configured channel key.
    pub fn id<'a>(&'a self, keys: &FieldKeys) -> Option<&'a Value> {
        present(self.0.get(&keys.channel))
    }

    /// Identifier rendered as a map key (strings verbatim, other values as JSON).
    pub fn id_key(&self, keys: &FieldKeys) -> Option<String> {
        self.id(keys).map(value_key)
    }

    /// Logo reference under the configured logo key.
    pub fn logo<'a>(&'a self, keys: &FieldKeys) -> Option<&'a str> {
        self.0.get(&keys.logo).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl Program {
    /// Channel reference under the configured program-channel key.
    pub fn channel_ref<'a>(&'a self, keys: &FieldKeys) -> Option<&'a Value> {
        present(self.0.get(&keys.program_channel))
    }

    pub fn since<'a>(&'a self, keys: &FieldKeys) -> Option<&'a Value> {
        present(self.0.get(&keys.since))
    }

    pub fn till<'a>(&'a self, keys: &FieldKeys) -> Option<&'a Value> {
        present(self.0.get(&keys.till))
    }

    /// True for placeholder blocks ("no data" slots).
    pub fn is_empty(&self) -> bool {
        self.0.get(IS_EMPTY_KEY).is_some_and(is_truthy)
    }

    /// True when both programs reference the same channel.
    pub fn same_channel(&self, other: &Program, keys: &FieldKeys) -> bool {
        match (self.channel_ref(keys), other.channel_ref(keys)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Copy of the record with normalized `since`/`till` strings.
    pub(crate) fn with_times(&self, keys: &FieldKeys, since: String, till: String) -> Program {
        let mut data = self.0.clone();
        data.insert(keys.since.clone(), Value::String(since));
        data.insert(keys.till.clone(), Value::String(till));
        Program(data)
    }
}

impl From<Value> for Channel {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl From<Value> for Program {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Stringify an identifier the way object keys are formed in JavaScript.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strict identity of an identifier: `7` and `"7"` are different channels,
/// matching [`Program::same_channel`].
pub fn identity_key(value: &Value) -> String {
    value.to_string()
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_keys() {
        let keys = FieldKeys {
            channel: "id".to_string(),
            program_channel: "channelId".to_string(),
            ..FieldKeys::default()
        };
        let channel = Channel::from(json!({"id": 7, "logo": "a.png"}));
        let program = Program::from(json!({"channelId": 7, "since": "2024-01-01T00:00:00"}));

        assert_eq!(channel.id(&keys), program.channel_ref(&keys));
        assert_eq!(channel.id_key(&keys).as_deref(), Some("7"));
        assert_eq!(channel.logo(&keys), Some("a.png"));
    }

    #[test]
    fn test_is_empty_flag() {
        assert!(Program::from(json!({"isEmpty": true})).is_empty());
        assert!(!Program::from(json!({"isEmpty": false})).is_empty());
        assert!(!Program::from(json!({"title": "News"})).is_empty());
    }

    #[test]
    fn test_missing_references_never_match() {
        let keys = FieldKeys::default();
        let a = Program::from(json!({"title": "A"}));
        let b = Program::from(json!({"title": "B", "channelUuid": null}));
        assert!(!a.same_channel(&b, &keys));
    }

    #[test]
    fn test_with_times_leaves_source_untouched() {
        let keys = FieldKeys::default();
        let program = Program::from(json!({"since": 0, "till": 1}));
        let normalized = program.with_times(
            &keys,
            "2024-01-01T00:00:00".to_string(),
            "2024-01-01T01:00:00".to_string(),
        );
        assert_eq!(program.since(&keys), Some(&json!(0)));
        assert_eq!(
            normalized.since(&keys),
            Some(&json!("2024-01-01T00:00:00"))
        );
    }
}
