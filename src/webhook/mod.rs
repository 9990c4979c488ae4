//! WhatsApp Cloud API webhook
//!
//! Receives the subscription challenge and the signed event deliveries
//! WhatsApp sends to the configured path, and hands normalized events to a
//! [`WebhookHandler`].
//!
//! ## Submodules
//!
//! - [`routes`] - HTTP endpoint handlers (GET challenge, POST events)
//! - [`security`] - `X-Hub-Signature-256` verification
//! - [`schemas`] - Raw payload structures
//! - [`handler`] - Normalization and sequential dispatch to the caller

pub mod handler;
pub mod routes;
pub mod schemas;
pub mod security;

use crate::consts;
use std::sync::Arc;

pub use handler::{DispatchReport, WebhookHandler, process_webhook};
pub use security::WebhookSecret;

/// Webhook settings provided by the caller
#[derive(Debug, Clone)]
pub struct WebhookOptions {
    /// App secret used to check payload signatures. `None` disables the check.
    pub app_secret: Option<String>,
    /// Token expected in `hub.verify_token` during the subscription challenge
    pub verify_token: String,
    pub webhook_path: String,
    /// Log path and raw body of every request before processing it
    pub log_all_requests: bool,
}

impl WebhookOptions {
    pub fn new(verify_token: impl Into<String>) -> Self {
        Self {
            app_secret: None,
            verify_token: verify_token.into(),
            webhook_path: consts::DEFAULT_WEBHOOK_PATH.to_string(),
            log_all_requests: false,
        }
    }

    pub fn with_app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn with_webhook_path(mut self, webhook_path: impl Into<String>) -> Self {
        self.webhook_path = webhook_path.into();
        self
    }

    pub fn with_log_all_requests(mut self, log_all_requests: bool) -> Self {
        self.log_all_requests = log_all_requests;
        self
    }
}

/// Read-only state shared by the webhook endpoints
#[derive(Clone)]
pub struct WebhookState {
    pub secret: WebhookSecret,
    pub verify_token: String,
    pub webhook_path: String,
    pub log_all_requests: bool,
    pub handler: Arc<dyn WebhookHandler>,
}

impl WebhookState {
    pub fn new(options: WebhookOptions, handler: Arc<dyn WebhookHandler>) -> Self {
        let secret = WebhookSecret::from(options.app_secret);
        if secret.is_disabled() {
            logfire::warn!(
                "No app secret configured: webhook payload signatures will NOT be verified"
            );
        }

        Self {
            secret,
            verify_token: options.verify_token,
            webhook_path: options.webhook_path,
            log_all_requests: options.log_all_requests,
            handler,
        }
    }
}
