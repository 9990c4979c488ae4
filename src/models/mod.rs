//! Caller facing representation of inbound webhook events

pub mod message;
pub mod status;

pub use message::{InteractiveType, Message, MessageKind, MessageType};
pub use status::{Status, StatusError, StatusErrorData};
