// RPC Envelope Domain Model

use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `{method, payload}` message carried as JSON text inside a queue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub method: String,

    /// `None` is omitted from the text; an explicit `null` is kept as `Some(Value::Null)`
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_payload"
    )]
    pub payload: Option<Value>,
}

// Only called when the field is present, so `null` stays distinct from absent
fn present_payload<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Envelope {
    pub fn new(method: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            method: method.into(),
            payload,
        }
    }

    /// Serialize into the text stored in `QueueEntry::message`
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse text produced by [`Envelope::to_text`]
    ///
    /// Anything that is not a JSON object with a string `method` is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AppError::MalformedEnvelope(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_survives_text_form() {
        let envelope = Envelope::new("foo", Some(json!({"a": 1})));
        let text = envelope.to_text().unwrap();
        assert_eq!(text, r#"{"method":"foo","payload":{"a":1}}"#);
        assert_eq!(Envelope::parse(&text).unwrap(), envelope);
    }

    #[test]
    fn test_missing_payload_is_omitted() {
        let text = Envelope::new("ping", None).to_text().unwrap();
        assert_eq!(text, r#"{"method":"ping"}"#);
    }

    #[test]
    fn test_null_payload_is_kept() {
        let envelope = Envelope::new("m", Some(Value::Null));
        let text = envelope.to_text().unwrap();

        assert_eq!(text, r#"{"method":"m","payload":null}"#);
        assert_eq!(Envelope::parse(&text).unwrap(), envelope);
    }

    #[test]
    fn test_absent_payload_parses_as_none() {
        let envelope = Envelope::parse(r#"{"method":"m"}"#).unwrap();
        assert_eq!(envelope, Envelope::new("m", None));
    }

    #[test]
    fn test_non_envelope_text_is_malformed() {
        for text in ["plain text", "42", r#"{"payload":1}"#, r#"{"method":7}"#] {
            assert!(
                matches!(Envelope::parse(text), Err(AppError::MalformedEnvelope(_))),
                "{} should be rejected",
                text
            );
        }
    }
}
