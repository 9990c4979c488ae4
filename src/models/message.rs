use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message types WhatsApp reports in the `type` field of an inbound message
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[display("audio")]
    Audio,
    /// Quick reply button of a template message
    #[display("button")]
    Button,
    #[display("document")]
    Document,
    #[display("text")]
    Text,
    #[display("image")]
    Image,
    #[display("interactive")]
    Interactive,
    #[display("order")]
    Order,
    #[display("sticker")]
    Sticker,
    #[display("system")]
    System,
    #[display("unknown")]
    Unknown,
    #[display("video")]
    Video,
    #[display("location")]
    Location,
    #[display("contacts")]
    Contacts,
    #[display("catalog")]
    Catalog,
    #[display("multi_product")]
    MultiProduct,
}

impl MessageType {
    /// Types whose payload is forwarded untouched from the sub-object
    /// named after the type.
    pub fn passthrough(raw_type: &str) -> Option<Self> {
        match raw_type {
            "image" => Some(Self::Image),
            "document" => Some(Self::Document),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "sticker" => Some(Self::Sticker),
            "location" => Some(Self::Location),
            "button" => Some(Self::Button),
            "contacts" => Some(Self::Contacts),
            _ => None,
        }
    }
}

/// Reply kinds nested under `interactive.type`
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractiveType {
    #[display("button_reply")]
    ButtonReply,
    #[display("list_reply")]
    ListReply,
    /// Any other sub-type (e.g. `nfm_reply` from a Flow), kept verbatim
    #[display("{_0}")]
    #[serde(untagged)]
    Other(String),
}

impl InteractiveType {
    /// `None` only for an empty sub-type
    pub fn from_raw(raw_type: &str) -> Option<Self> {
        match raw_type {
            "" => None,
            "button_reply" => Some(Self::ButtonReply),
            "list_reply" => Some(Self::ListReply),
            other => Some(Self::Other(other.to_string())),
        }
    }
}

/// The `type` of a normalized [`Message`]: either a plain message type or,
/// for interactive replies, the interactive sub-type.
///
/// Serialized as the bare type string (`"text"`, `"list_reply"`, ...).
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageKind {
    Message(MessageType),
    Interactive(InteractiveType),
}

impl From<MessageType> for MessageKind {
    fn from(value: MessageType) -> Self {
        Self::Message(value)
    }
}

impl From<InteractiveType> for MessageKind {
    fn from(value: InteractiveType) -> Self {
        Self::Interactive(value)
    }
}

/// Inbound message flattened out of the webhook envelope.
///
/// `data` holds the type specific payload, e.g. `{"text": "hi"}` for text
/// messages or the `list_reply` object for list replies. When the message
/// quotes another one, the quoted reference is stored under `data.context`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Message {
    /// Sender's WhatsApp ID (phone number), empty when WhatsApp omitted it
    pub from: String,
    /// Sender's profile name
    pub name: Option<String>,
    pub id: String,
    /// Unix seconds, as sent by WhatsApp
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: Map<String, Value>,
    /// Business phone number ID that received the message
    pub to_phone_number_id: String,
}

impl Message {
    /// Body of a text message
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Message(MessageType::Text) => self.data.get("text")?.as_str(),
            _ => None,
        }
    }

    /// ID of the message this one replies to
    pub fn context_message_id(&self) -> Option<&str> {
        self.data.get("context")?.get("id")?.as_str()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        parse_unix_seconds(&self.timestamp)
    }
}

pub(crate) fn parse_unix_seconds(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.parse().ok()?, 0)
}
