//! Application configuration, read once from the environment.
//!
//! # Security Notes
//! - Sensitive fields are marked and should never be logged
//! - `whatsapp_app_secret` should always be set outside local development

use crate::{
    sender::MessageSender,
    webhook::WebhookOptions,
};
use anyhow::Context;
use envconfig::Envconfig;
use std::sync::OnceLock;

/// Every field maps to the upper-cased environment variable of the same name.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// 🔒 SENSITIVE: Graph API access token used by the sender
    pub whatsapp_access_token: String,

    /// WhatsApp Business phone number ID messages are sent from (SEMI-SENSITIVE)
    pub whatsapp_phone_number_id: String,

    /// 🔒 SENSITIVE: Token expected in the subscription challenge
    pub whatsapp_verify_token: String,

    /// 🔒 SENSITIVE: App secret used to verify payload signatures.
    /// Unset disables verification.
    pub whatsapp_app_secret: Option<String>,

    #[envconfig(default = "/")]
    pub whatsapp_webhook_path: String,

    /// Log path and raw body of every webhook request
    #[envconfig(default = "false")]
    pub whatsapp_log_requests: bool,

    #[envconfig(default = "v14.0")]
    pub whatsapp_graph_version: String,

    /// Host address for web server binding
    #[envconfig(default = "0.0.0.0")]
    pub server_host: String,

    #[envconfig(default = "8080")]
    pub server_port: u16,
}

impl AppConfig {
    pub fn webhook_options(&self) -> WebhookOptions {
        let mut options = WebhookOptions::new(self.whatsapp_verify_token.clone())
            .with_webhook_path(self.whatsapp_webhook_path.clone())
            .with_log_all_requests(self.whatsapp_log_requests);

        if let Some(app_secret) = self.whatsapp_app_secret.as_deref().filter(|s| !s.is_empty()) {
            options = options.with_app_secret(app_secret);
        }

        options
    }

    pub fn message_sender(&self) -> MessageSender {
        MessageSender::new(
            self.whatsapp_phone_number_id.clone(),
            self.whatsapp_access_token.clone(),
        )
        .with_graph_version(self.whatsapp_graph_version.clone())
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!(
            "{host}:{port}",
            host = self.server_host,
            port = self.server_port
        )
    }
}

/// Global application configuration, set by [`init_config`]
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Loads [`AppConfig`] from the environment into [`APP_CONFIG`]
pub fn init_config() -> anyhow::Result<&'static AppConfig> {
    if let Some(app_config) = APP_CONFIG.get() {
        return Ok(app_config);
    }

    let app_config = AppConfig::init_from_env()
        .context("Failed to load application configuration. Check environment variables.")?;

    Ok(APP_CONFIG.get_or_init(|| app_config))
}
