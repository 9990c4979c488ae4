//! # WhatsApp Cloud Bot
//!
//! Client and webhook server for the WhatsApp Cloud API.
//!
//! - [`sender`] - Sends text, media, location, template, contact and
//!   interactive messages through the Graph API
//! - [`webhook`] - Answers the subscription challenge, verifies signed
//!   deliveries and hands normalized [`models::Message`] and
//!   [`models::Status`] events to a [`webhook::WebhookHandler`]

pub mod config;
pub mod consts;
pub mod errors;
pub mod models;
pub mod sender;
pub mod utils;
pub mod webhook;

pub use errors::{SendError, WebhookError};
pub use models::{Message, MessageKind, Status};
pub use sender::{MessageSender, SendMessageResult};
pub use webhook::{WebhookHandler, WebhookOptions, WebhookState};
