use super::outgoing_schemas::SendMessageResult;
use async_trait::async_trait;
use serde::Serialize;

/// Request and outcome of one successful send
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    pub from_phone_number_id: String,
    pub request_body: serde_json::Value,
    pub response_summary: SendMessageResult,
}

/// Hook called after every successful send, e.g. to store the conversation.
///
/// Errors are logged by the sender and never fail the send.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseLogger: Send + Sync {
    async fn log(&self, record: &SendRecord) -> anyhow::Result<()>;
}

/// Default [`ResponseLogger`]: writes the record to the application log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogfireResponseLogger;

#[async_trait]
impl ResponseLogger for LogfireResponseLogger {
    async fn log(&self, record: &SendRecord) -> anyhow::Result<()> {
        logfire::info!(
            "WhatsApp message sent from {from}: {record}",
            from = record.from_phone_number_id.clone(),
            record = serde_json::to_string(record)?
        );
        Ok(())
    }
}
