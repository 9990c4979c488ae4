//! # WhatsApp Echo Bot
//!
//! Answers every text message with the same text, quoting the original,
//! and logs delivery statuses.

use anyhow::Context;
use async_trait::async_trait;
use ntex::web;
use std::sync::Arc;
use whatsapp_cloud_bot::{
    Message, MessageSender, Status, WebhookHandler, WebhookState, config,
    sender::TextOptions, webhook,
};

struct EchoBot {
    sender: MessageSender,
}

#[async_trait]
impl WebhookHandler for EchoBot {
    #[tracing::instrument(skip_all, fields(message_id = %message.id, kind = %message.kind))]
    async fn on_new_message(&self, message: Message) -> anyhow::Result<()> {
        let Some(text) = message.text() else {
            logfire::info!(
                "Ignoring {kind} message from {from}",
                kind = message.kind.to_string(),
                from = message.from.clone()
            );
            return Ok(());
        };

        let options = TextOptions {
            reply: Some(message.id.clone()),
            ..Default::default()
        };
        let result = self
            .sender
            .send_text(&message.from, text, options)
            .await
            .context("failed to echo text message")?;

        logfire::info!(
            "Echoed message {id} as {sent}",
            id = message.id.clone(),
            sent = result.message_id.unwrap_or_default()
        );
        Ok(())
    }

    async fn on_status_change(&self, status: Status) -> anyhow::Result<()> {
        if status.is_failed() {
            logfire::warn!(
                "Message {id} to {recipient} failed: {errors}",
                id = status.id.clone(),
                recipient = status.recipient_id.clone(),
                errors = serde_json::to_string(&status.errors)?
            );
        } else {
            logfire::info!(
                "Message {id} is {status}",
                id = status.id.clone(),
                status = status.status.clone()
            );
        }
        Ok(())
    }
}

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::init_config()?;

    // Console output always; shipping to Logfire only when LOGFIRE_TOKEN is set
    let shutdown_handler = logfire::configure()
        .install_panic_handler()
        .send_to_logfire(logfire::config::SendToLogfire::IfTokenPresent)
        .finish()?;

    let bot = EchoBot {
        sender: app_config.message_sender(),
    };
    let state = WebhookState::new(app_config.webhook_options(), Arc::new(bot));

    let server_addr = app_config.bind_address();
    logfire::info!(
        "Listening on {addr}, webhook at {path}",
        addr = server_addr.clone(),
        path = state.webhook_path.clone()
    );

    web::server(move || web::App::new().configure(webhook::routes::whatsapp(state.clone())))
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    shutdown_handler.shutdown()?;

    Ok(())
}
