use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Delivery status update for a message previously sent by the business.
///
/// Fields WhatsApp adds beyond the ones modelled here (`conversation`,
/// `pricing`, ...) are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Status {
    /// Unix seconds
    #[serde(default)]
    pub timestamp: String,
    /// `sent`, `delivered`, `read`, `failed`, ...
    #[serde(default)]
    pub status: String,
    /// Recipient phone number
    #[serde(default)]
    pub recipient_id: String,
    /// ID of the sent message this status refers to
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<StatusError>>,
    #[serde(default)]
    pub to_phone_number_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Status {
    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        super::message::parse_unix_seconds(&self.timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatusError {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_data: Option<StatusErrorData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatusErrorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_status_deserialization() {
        let status: Status = serde_json::from_value(json!({
            "id": "wamid.HBgL",
            "status": "failed",
            "timestamp": "1700000000",
            "recipient_id": "5215512345678",
            "errors": [{
                "code": 131047,
                "title": "Re-engagement message",
                "error_data": {"details": "Message failed to send because more than 24 hours have passed"}
            }]
        }))
        .unwrap();

        assert!(status.is_failed());
        assert_eq!(status.recipient_id, "5215512345678");
        let errors = status.errors.as_ref().unwrap();
        assert_eq!(errors[0].code, 131047);
        assert_eq!(
            errors[0].error_data.as_ref().and_then(|d| d.details.as_deref()),
            Some("Message failed to send because more than 24 hours have passed")
        );
        assert!(status.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let status: Status = serde_json::from_value(json!({
            "id": "wamid.1",
            "status": "delivered",
            "timestamp": "1700000000",
            "recipient_id": "1",
            "pricing": {"billable": true, "category": "service"}
        }))
        .unwrap();

        assert!(!status.is_failed());
        assert_eq!(status.extra["pricing"]["category"], "service");

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["pricing"]["billable"], true);
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let status: Status = serde_json::from_value(json!({})).unwrap();
        assert_eq!(status, Status::default());
        assert!(status.sent_at().is_none());
    }
}
