//! Outbound side of the WhatsApp Cloud API
//!
//! - [`client`] - [`MessageSender`], one `send_*` operation per message shape
//! - [`outgoing_schemas`] - Wire format of outgoing messages and API responses
//! - [`options`] - Optional arguments of the send operations
//! - [`logger`] - Hook called after every successful send

pub mod client;
pub mod logger;
pub mod options;
pub mod outgoing_schemas;

pub use client::MessageSender;
pub use logger::{LogfireResponseLogger, ResponseLogger, SendRecord};
pub use options::{
    CatalogOptions, InteractiveOptions, LocationOptions, MediaOptions, ProductOptions,
    ReplyOptions, TextOptions,
};
pub use outgoing_schemas::SendMessageResult;
