//! # WhatsApp Webhook Schemas
//!
//! Raw shape of the JSON WhatsApp POSTs to the webhook. Only the top level
//! (`object` and `entry`) is checked up front. Entries, changes and values
//! are walked as plain JSON, and each message record is read into a
//! [`RawMessage`] on its own, so one odd record never rejects its siblings.

use crate::{errors::WebhookError, utils};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::slice;

/// Root webhook payload from WhatsApp
#[derive(Debug, Deserialize)]
pub struct InboundEnvelope {
    /// The object type, typically "whatsapp_business_account"
    pub object: Value,
    /// Entry objects, each with a `changes` array
    pub entry: Vec<Value>,
}

impl InboundEnvelope {
    /// Parses a raw request body, checking the top level shape.
    ///
    /// `object` must be present and truthy and `entry` must be an array;
    /// anything else is a [`WebhookError::MalformedEnvelope`]. Nothing below
    /// `entry` is validated here.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        let raw: Value = serde_json::from_slice(body)
            .map_err(|e| WebhookError::MalformedEnvelope(format!("invalid JSON: {e}")))?;

        if !raw.get("object").is_some_and(utils::is_truthy) {
            return Err(WebhookError::MalformedEnvelope(
                "missing `object` field".to_string(),
            ));
        }
        if !raw.get("entry").is_some_and(Value::is_array) {
            return Err(WebhookError::MalformedEnvelope(
                "missing `entry` array".to_string(),
            ));
        }

        serde_json::from_value(raw)
            .map_err(|e| WebhookError::MalformedEnvelope(format!("unexpected envelope: {e}")))
    }

    /// Change values in delivery order (entries, then their changes).
    ///
    /// Entries without a `changes` array and changes without a `value` are
    /// skipped.
    pub fn values(&self) -> impl Iterator<Item = ChangeValue<'_>> {
        self.entry
            .iter()
            .flat_map(|entry| records(entry, "changes"))
            .filter_map(|change| change.get("value"))
            .filter(|value| !value.is_null())
            .map(ChangeValue::new)
    }
}

/// Elements of the array under `key`, empty when it is absent or not an array
fn records<'a>(value: &'a Value, key: &str) -> slice::Iter<'a, Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter())
        .unwrap_or_default()
}

/// Value object of a change: `metadata`, `contacts`, `messages` and
/// `statuses`, read on demand.
#[derive(Debug, Clone, Copy)]
pub struct ChangeValue<'a> {
    raw: &'a Value,
}

impl<'a> ChangeValue<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    /// Business phone number that received the events, empty when absent
    pub fn phone_number_id(&self) -> &'a str {
        self.raw
            .pointer("/metadata/phone_number_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Profile name of the first contact, shared by every message of the value
    pub fn profile_name(&self) -> Option<&'a str> {
        self.raw.pointer("/contacts/0/profile/name")?.as_str()
    }

    /// Message records, still raw; see [`RawMessage`]
    pub fn messages(&self) -> slice::Iter<'a, Value> {
        records(self.raw, "messages")
    }

    /// Status records are kept raw; [`crate::models::Status`] passes unknown
    /// fields through.
    pub fn statuses(&self) -> slice::Iter<'a, Value> {
        records(self.raw, "statuses")
    }
}

/// Message object as received.
///
/// Type specific sub-objects (`image`, `location`, `contacts`, ...) and the
/// reply `context` land in `rest`, keyed by their JSON name.
#[derive(Debug, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub text: Option<RawText>,
    #[serde(default)]
    pub interactive: Option<RawInteractive>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RawText {
    #[serde(default)]
    pub body: Option<Value>,
}

/// Reply to an interactive (buttons or list) message
#[derive(Debug, Deserialize)]
pub struct RawInteractive {
    #[serde(rename = "type", default)]
    pub interactive_type: Option<String>,
    #[serde(default)]
    pub list_reply: Option<Value>,
    #[serde(default)]
    pub button_reply: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_envelope_requires_object_and_entry() {
        let missing_object = envelope_bytes(json!({"entry": []}));
        assert!(matches!(
            InboundEnvelope::from_slice(&missing_object),
            Err(WebhookError::MalformedEnvelope(_))
        ));

        let empty_object = envelope_bytes(json!({"object": "", "entry": []}));
        assert!(InboundEnvelope::from_slice(&empty_object).is_err());

        let missing_entry = envelope_bytes(json!({"object": "whatsapp_business_account"}));
        assert!(InboundEnvelope::from_slice(&missing_entry).is_err());

        let entry_not_array = envelope_bytes(json!({"object": "whatsapp_business_account", "entry": {}}));
        assert!(InboundEnvelope::from_slice(&entry_not_array).is_err());

        assert!(InboundEnvelope::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_values_skip_missing_changes_and_values() {
        let body = envelope_bytes(json!({
            "object": "whatsapp_business_account",
            "entry": [
                {"id": "1"},
                {"id": "2", "changes": null},
                {"id": "3", "changes": [
                    {"field": "messages"},
                    {"field": "messages", "value": null},
                    {"field": "messages", "value": {"metadata": {"phone_number_id": "10001"}}}
                ]}
            ]
        }));

        let envelope = InboundEnvelope::from_slice(&body).unwrap();
        let values: Vec<_> = envelope.values().collect();

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].phone_number_id(), "10001");
        assert_eq!(values[0].messages().count(), 0);
        assert_eq!(values[0].statuses().count(), 0);
    }

    #[test]
    fn test_odd_entries_do_not_reject_the_envelope() {
        let body = envelope_bytes(json!({
            "object": "whatsapp_business_account",
            "entry": [
                5,
                {"id": 42, "changes": "nope"},
                {"changes": [
                    {"value": {
                        "metadata": {"phone_number_id": 10001},
                        "contacts": {"profile": {"name": "Ana"}},
                        "messages": {"not": "an array"},
                        "statuses": [{"id": "s1"}]
                    }}
                ]}
            ]
        }));

        let envelope = InboundEnvelope::from_slice(&body).unwrap();
        let values: Vec<_> = envelope.values().collect();

        assert_eq!(values.len(), 1);
        assert_eq!(values[0].phone_number_id(), "");
        assert_eq!(values[0].profile_name(), None);
        assert_eq!(values[0].messages().count(), 0);
        assert_eq!(values[0].statuses().count(), 1);
    }

    #[test]
    fn test_raw_message_keeps_type_specific_fields() {
        let message: RawMessage = serde_json::from_value(json!({
            "from": "5215512345678",
            "id": "wamid.1",
            "timestamp": "1700000000",
            "type": "image",
            "image": {"id": "9001", "mime_type": "image/jpeg"},
            "context": {"from": "10001", "id": "wamid.0"}
        }))
        .unwrap();

        assert_eq!(message.msg_type.as_deref(), Some("image"));
        assert_eq!(message.rest["image"]["id"], "9001");
        assert_eq!(message.rest["context"]["id"], "wamid.0");
        assert!(!message.rest.contains_key("from"));
    }

    #[test]
    fn test_raw_message_rejects_mistyped_fields() {
        let numeric_timestamp = json!({"id": "wamid.1", "timestamp": 1700000000, "type": "text"});
        assert!(RawMessage::deserialize(&numeric_timestamp).is_err());

        let text_as_string = json!({"id": "wamid.2", "type": "text", "text": "hola"});
        assert!(RawMessage::deserialize(&text_as_string).is_err());
    }

    #[test]
    fn test_profile_name_uses_first_contact() {
        let raw = json!({
            "contacts": [
                {"profile": {"name": "Ana"}, "wa_id": "1"},
                {"profile": {"name": "Luis"}, "wa_id": "2"}
            ]
        });
        assert_eq!(ChangeValue::new(&raw).profile_name(), Some("Ana"));

        let raw = json!({"contacts": [{"wa_id": "1"}]});
        assert_eq!(ChangeValue::new(&raw).profile_name(), None);
    }
}
