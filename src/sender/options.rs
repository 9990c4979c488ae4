//! Optional arguments of the `send_*` operations.
//!
//! `reply` is the ID of the message being answered; when set (and not
//! empty) the sent message quotes it.

use super::outgoing_schemas::InteractiveHeader;

#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Render a preview for the first URL in the body
    pub preview_url: Option<bool>,
    pub reply: Option<String>,
}

/// Options for image, document and video messages
#[derive(Debug, Clone, Default)]
pub struct MediaOptions {
    pub caption: Option<String>,
    /// Shown for documents
    pub filename: Option<String>,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplyOptions {
    pub reply: Option<String>,
}

impl ReplyOptions {
    pub fn replying_to(message_id: impl Into<String>) -> Self {
        Self {
            reply: Some(message_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocationOptions {
    pub name: Option<String>,
    pub address: Option<String>,
    pub reply: Option<String>,
}

/// Options for reply button and list messages
#[derive(Debug, Clone, Default)]
pub struct InteractiveOptions {
    pub footer_text: Option<String>,
    pub header: Option<InteractiveHeader>,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductOptions {
    pub body: Option<String>,
    pub footer_text: Option<String>,
    pub product_retailer_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogOptions {
    pub footer_text: Option<String>,
    /// Product whose image is used as the catalog thumbnail
    pub thumbnail_product_retailer_id: Option<String>,
}
