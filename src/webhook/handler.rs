//! # WhatsApp Webhook Handler
//!
//! Normalizes the records of an [`InboundEnvelope`] into [`Message`] and
//! [`Status`] events and hands them, one by one, to a caller supplied
//! [`WebhookHandler`].

use super::schemas::{ChangeValue, InboundEnvelope, RawMessage};
use crate::{
    models::{InteractiveType, Message, MessageKind, MessageType, Status},
    utils,
};
use async_trait::async_trait;
use futures::FutureExt;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{any::Any, future::Future, panic::AssertUnwindSafe};

/// Callbacks invoked for every event of a webhook request.
///
/// Calls are awaited one at a time, in payload order. An `Err` (or a
/// panic) is logged and does not stop the remaining events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn on_new_message(&self, message: Message) -> anyhow::Result<()>;

    async fn on_status_change(&self, _status: Status) -> anyhow::Result<()> {
        Ok(())
    }
}

/// What happened to the records of one webhook request
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages handed to [`WebhookHandler::on_new_message`]
    pub messages: usize,
    /// Statuses handed to [`WebhookHandler::on_status_change`]
    pub statuses: usize,
    /// Records that could not be read or normalized
    pub dropped: usize,
    /// Handler calls that returned an error or panicked
    pub failed: usize,
}

/// Maps a raw message to its `(type, data)` pair.
///
/// | raw `type` | emitted type | emitted data |
/// |---|---|---|
/// | `text` | `text` | `{"text": text.body}` |
/// | `image`, `document`, `audio`, `video`, `sticker`, `location`, `button`, `contacts` | same | the sub-object named after the type |
/// | `interactive` | `interactive.type` | `interactive.list_reply`, else `interactive.button_reply`, else `{}` |
///
/// Interactive sub-types other than the two reply kinds (e.g. `nfm_reply`)
/// are kept as [`InteractiveType::Other`]. A `context` on the raw record is
/// added to `data` whatever the branch. Anything else yields `None` and the
/// record is dropped.
pub fn classify_message(raw: &RawMessage) -> Option<(MessageKind, Map<String, Value>)> {
    let raw_type = raw.msg_type.as_deref()?;

    let (kind, data): (MessageKind, Option<Map<String, Value>>) = match raw_type {
        "text" => {
            let mut data = Map::new();
            if let Some(body) = raw.text.as_ref().and_then(|t| t.body.clone()) {
                data.insert("text".to_string(), body);
            }
            (MessageType::Text.into(), Some(data))
        }
        "interactive" => {
            let interactive = raw.interactive.as_ref()?;
            let kind = InteractiveType::from_raw(interactive.interactive_type.as_deref()?)?;
            let reply = interactive
                .list_reply
                .as_ref()
                .or(interactive.button_reply.as_ref());
            let data = reply
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            (kind.into(), Some(data))
        }
        other => {
            let message_type = MessageType::passthrough(other)?;
            let data = raw.rest.get(other).and_then(as_data_map);
            (message_type.into(), data)
        }
    };

    let data = match raw.rest.get("context").filter(|c| utils::is_truthy(c)) {
        Some(context) => {
            let mut data = data.unwrap_or_default();
            data.insert("context".to_string(), context.clone());
            Some(data)
        }
        None => data,
    };

    data.map(|data| (kind, data))
}

/// Objects are forwarded as they are; arrays (e.g. `contacts`) are keyed
/// by element index.
fn as_data_map(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item.clone()))
                .collect(),
        ),
        _ => None,
    }
}

/// Builds the caller facing [`Message`], or `None` when it cannot be classified
pub fn normalize_message(raw: &RawMessage, value: &ChangeValue<'_>) -> Option<Message> {
    let (kind, data) = classify_message(raw)?;

    Some(Message {
        from: raw.from.clone().unwrap_or_default(),
        name: value.profile_name().map(str::to_string),
        id: raw.id.clone().unwrap_or_default(),
        timestamp: raw.timestamp.clone().unwrap_or_default(),
        kind,
        data,
        to_phone_number_id: value.phone_number_id().to_string(),
    })
}

/// Builds the caller facing [`Status`], keeping every raw field
pub fn normalize_status(raw: &Value, value: &ChangeValue<'_>) -> Option<Status> {
    match Status::deserialize(raw) {
        Ok(mut status) => {
            status.to_phone_number_id = value.phone_number_id().to_string();
            Some(status)
        }
        Err(e) => {
            logfire::warn!(
                "Skipping status record with unexpected shape: {error}",
                error = e.to_string()
            );
            None
        }
    }
}

/// Main webhook processor
///
/// Walks entries, changes and values in order. Within a value every message
/// is dispatched before any status. A record with an unexpected shape is
/// dropped on its own. Returns once every handler call has settled.
pub async fn process_webhook(
    envelope: &InboundEnvelope,
    handler: &dyn WebhookHandler,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for value in envelope.values() {
        for record in value.messages() {
            let raw = match RawMessage::deserialize(record) {
                Ok(raw) => raw,
                Err(e) => {
                    logfire::warn!(
                        "Skipping message record with unexpected shape: {error}",
                        error = e.to_string()
                    );
                    report.dropped += 1;
                    continue;
                }
            };

            let Some(message) = normalize_message(&raw, &value) else {
                logfire::debug!(
                    "Dropping unsupported message type: {message_type}",
                    message_type = raw.msg_type.clone().unwrap_or_default()
                );
                report.dropped += 1;
                continue;
            };

            let message_id = message.id.clone();
            report.messages += 1;
            if let Err(e) = settle(handler.on_new_message(message)).await {
                report.failed += 1;
                logfire::error!(
                    "Failed to handle message {id}: {error}",
                    id = message_id,
                    error = format!("{e:#}")
                );
            }
        }

        for raw in value.statuses() {
            let Some(status) = normalize_status(raw, &value) else {
                report.dropped += 1;
                continue;
            };

            let status_id = status.id.clone();
            report.statuses += 1;
            if let Err(e) = settle(handler.on_status_change(status)).await {
                report.failed += 1;
                logfire::error!(
                    "Failed to handle status of {id}: {error}",
                    id = status_id,
                    error = format!("{e:#}")
                );
            }
        }
    }

    report
}

/// Awaits a handler call, turning a panic into an error
async fn settle<F>(call: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(anyhow::anyhow!(
            "handler panicked: {}",
            panic_message(panic.as_ref())
        )),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
