//! # WhatsApp Outgoing Message Schemas
//!
//! JSON payloads accepted by `POST /{phone_number_id}/messages`. Every
//! message shares the envelope in [`OutgoingMessage`]; the `type` field and
//! the type specific object come from [`OutgoingContent`].

use super::options::{
    CatalogOptions, InteractiveOptions, LocationOptions, MediaOptions, ProductOptions,
    ReplyOptions, TextOptions,
};
use crate::{consts, utils};
use serde::{Deserialize, Serialize};

/// Envelope shared by every outgoing message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    /// Messaging product, always "whatsapp"
    pub messaging_product: String,
    pub recipient_type: String,
    /// Recipient's WhatsApp ID (phone number)
    pub to: String,
    /// Message being replied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ReplyContext>,
    #[serde(flatten)]
    pub content: OutgoingContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyContext {
    pub message_id: String,
}

/// Message type and its content, serialized as `"type": ..., "<type>": {...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingContent {
    Text { text: TextContent },
    Reaction { reaction: Reaction },
    Image { image: MediaObject },
    Document { document: MediaObject },
    Audio { audio: MediaObject },
    Video { video: MediaObject },
    Sticker { sticker: MediaObject },
    Location { location: Location },
    Template { template: Template },
    Contacts { contacts: Vec<Contact> },
    Interactive { interactive: Interactive },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reaction {
    pub message_id: String,
    pub emoji: String,
}

/// Media referenced either by link or by a previously uploaded media ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl MediaObject {
    /// `link` when `url_or_id` looks like a URL, `id` otherwise
    pub fn from_source(url_or_id: impl Into<String>) -> Self {
        let source = url_or_id.into();
        if utils::looks_like_url(&source) {
            Self {
                link: Some(source),
                ..Default::default()
            }
        } else {
            Self {
                id: Some(source),
                ..Default::default()
            }
        }
    }

    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Pre-approved message template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<TemplateComponent>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

/// Values for the variables of a template section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateComponent {
    Header {
        parameters: Vec<TemplateParameter>,
    },
    Body {
        parameters: Vec<TemplateParameter>,
    },
    Button {
        sub_type: ButtonSubType,
        /// Position of the button, 0 to 2
        index: u8,
        parameters: Vec<ButtonParameter>,
    },
}

impl TemplateComponent {
    pub const MAX_BUTTON_INDEX: u8 = 2;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateParameter {
    Text { text: String },
    Currency { currency: Currency },
    DateTime { date_time: DateTimeParameter },
    Image { image: MediaObject },
    Document { document: MediaObject },
    Video { video: MediaObject },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub fallback_value: String,
    /// ISO 4217 code
    pub code: String,
    /// Amount multiplied by 1000
    pub amount_1000: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeParameter {
    pub fallback_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonSubType {
    QuickReply,
    Url,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonParameter {
    Payload { payload: String },
    Text { text: String },
}

/// Contact card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<ContactAddress>,
    /// YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ContactEmail>,
    pub name: ContactName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<ContactOrg>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<ContactPhone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ContactUrl>,
}

/// Full name plus its parts; WhatsApp requires at least one part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactName {
    pub formatted_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ContactName {
    pub fn has_name_part(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.middle_name,
            &self.suffix,
            &self.prefix,
        ]
        .iter()
        .any(|part| part.as_deref().is_some_and(|p| !p.is_empty()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContactInfoType {
    Home,
    Work,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhoneType {
    Cell,
    Main,
    Iphone,
    Home,
    Work,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<ContactInfoType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEmail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub email_type: ContactInfoType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactOrg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPhone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<PhoneType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub url_type: Option<ContactInfoType>,
}

/// Interactive content, keyed by its `type`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interactive {
    Button {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<TextObject>,
        action: ButtonAction,
    },
    List {
        #[serde(skip_serializing_if = "Option::is_none")]
        header: Option<InteractiveHeader>,
        body: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<TextObject>,
        action: ListAction,
    },
    Product {
        body: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<TextObject>,
        action: ProductAction,
    },
    ProductList {
        header: InteractiveHeader,
        body: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<TextObject>,
        action: ProductListAction,
    },
    CatalogMessage {
        body: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        footer: Option<TextObject>,
        action: CatalogAction,
    },
}

/// Interactive message header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractiveHeader {
    Text { text: String },
    Video { video: MediaObject },
    Image { image: MediaObject },
    Document { document: MediaObject },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextObject {
    pub text: String,
}

impl TextObject {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Footer object, omitted when there is no footer text
    fn footer(text: Option<&str>) -> Option<Self> {
        text.filter(|t| !t.is_empty()).map(Self::new)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonAction {
    pub buttons: Vec<ButtonEntry>,
}

/// One reply button as sent on the wire: `{"type": "reply", "reply": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ButtonEntry {
    Reply { reply: ReplyButton },
}

/// Quick reply button; `id` comes back in the `button_reply` webhook event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub id: String,
    pub title: String,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListAction {
    pub button: String,
    pub sections: Vec<ListSection>,
}

/// Interactive section containing rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<InteractiveRow>,
}

/// Interactive row (list item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveRow {
    /// Unique row ID
    pub id: String,
    /// Row title (displayed to user)
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InteractiveRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAction {
    pub catalog_id: String,
    pub product_retailer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListAction {
    pub catalog_id: String,
    pub sections: Vec<ProductSectionPayload>,
}

/// Products of a multi product message, grouped under a title
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSection {
    pub title: String,
    pub product_ids: Vec<String>,
}

impl ProductSection {
    pub fn new(title: impl Into<String>, product_ids: Vec<String>) -> Self {
        Self {
            title: title.into(),
            product_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSectionPayload {
    pub title: String,
    pub product_items: Vec<ProductItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductItem {
    pub product_retailer_id: String,
}

impl From<ProductSection> for ProductSectionPayload {
    fn from(section: ProductSection) -> Self {
        Self {
            title: section.title,
            product_items: section
                .product_ids
                .into_iter()
                .map(|product_retailer_id| ProductItem {
                    product_retailer_id,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogAction {
    /// Always "catalog_message"
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<CatalogParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogParameters {
    pub thumbnail_product_retailer_id: String,
}

impl OutgoingMessage {
    fn new(to: impl Into<String>, reply: Option<&str>, content: OutgoingContent) -> Self {
        Self {
            messaging_product: consts::MESSAGING_PRODUCT.to_string(),
            recipient_type: consts::RECIPIENT_TYPE_INDIVIDUAL.to_string(),
            to: to.into(),
            context: reply.filter(|r| !r.is_empty()).map(|message_id| ReplyContext {
                message_id: message_id.to_string(),
            }),
            content,
        }
    }

    pub fn text(to: impl Into<String>, body: impl Into<String>, options: &TextOptions) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Text {
                text: TextContent {
                    body: body.into(),
                    preview_url: options.preview_url,
                },
            },
        )
    }

    pub fn reaction(
        to: impl Into<String>,
        emoji: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self::new(
            to,
            None,
            OutgoingContent::Reaction {
                reaction: Reaction {
                    message_id: message_id.into(),
                    emoji: emoji.into(),
                },
            },
        )
    }

    pub fn image(to: impl Into<String>, url_or_id: impl Into<String>, options: &MediaOptions) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Image {
                image: Self::captioned_media(url_or_id, options),
            },
        )
    }

    pub fn document(
        to: impl Into<String>,
        url_or_id: impl Into<String>,
        options: &MediaOptions,
    ) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Document {
                document: Self::captioned_media(url_or_id, options),
            },
        )
    }

    pub fn video(to: impl Into<String>, url_or_id: impl Into<String>, options: &MediaOptions) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Video {
                video: Self::captioned_media(url_or_id, options),
            },
        )
    }

    pub fn audio(to: impl Into<String>, url_or_id: impl Into<String>, options: &ReplyOptions) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Audio {
                audio: MediaObject::from_source(url_or_id),
            },
        )
    }

    pub fn sticker(
        to: impl Into<String>,
        url_or_id: impl Into<String>,
        options: &ReplyOptions,
    ) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Sticker {
                sticker: MediaObject::from_source(url_or_id),
            },
        )
    }

    fn captioned_media(url_or_id: impl Into<String>, options: &MediaOptions) -> MediaObject {
        MediaObject::from_source(url_or_id)
            .with_caption(options.caption.clone())
            .with_filename(options.filename.clone())
    }

    pub fn location(
        to: impl Into<String>,
        latitude: f64,
        longitude: f64,
        options: &LocationOptions,
    ) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Location {
                location: Location {
                    latitude,
                    longitude,
                    name: options.name.clone(),
                    address: options.address.clone(),
                },
            },
        )
    }

    pub fn template(
        to: impl Into<String>,
        name: impl Into<String>,
        language_code: impl Into<String>,
        components: Option<Vec<TemplateComponent>>,
    ) -> Self {
        Self::new(
            to,
            None,
            OutgoingContent::Template {
                template: Template {
                    name: name.into(),
                    language: TemplateLanguage {
                        code: language_code.into(),
                    },
                    components,
                },
            },
        )
    }

    pub fn contacts(to: impl Into<String>, contacts: Vec<Contact>, options: &ReplyOptions) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Contacts { contacts },
        )
    }

    /// Buttons keep the given order
    pub fn reply_buttons(
        to: impl Into<String>,
        body: impl Into<String>,
        buttons: Vec<ReplyButton>,
        options: &InteractiveOptions,
    ) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Interactive {
                interactive: Interactive::Button {
                    header: options.header.clone(),
                    body: TextObject::new(body),
                    footer: TextObject::footer(options.footer_text.as_deref()),
                    action: ButtonAction {
                        buttons: buttons
                            .into_iter()
                            .map(|reply| ButtonEntry::Reply { reply })
                            .collect(),
                    },
                },
            },
        )
    }

    pub fn list(
        to: impl Into<String>,
        button: impl Into<String>,
        body: impl Into<String>,
        sections: Vec<ListSection>,
        options: &InteractiveOptions,
    ) -> Self {
        Self::new(
            to,
            options.reply.as_deref(),
            OutgoingContent::Interactive {
                interactive: Interactive::List {
                    header: options.header.clone(),
                    body: TextObject::new(body),
                    footer: TextObject::footer(options.footer_text.as_deref()),
                    action: ListAction {
                        button: button.into(),
                        sections,
                    },
                },
            },
        )
    }

    pub fn product(
        to: impl Into<String>,
        catalog_id: impl Into<String>,
        options: &ProductOptions,
    ) -> Self {
        Self::new(
            to,
            None,
            OutgoingContent::Interactive {
                interactive: Interactive::Product {
                    body: TextObject::new(options.body.clone().unwrap_or_default()),
                    footer: TextObject::footer(options.footer_text.as_deref()),
                    action: ProductAction {
                        catalog_id: catalog_id.into(),
                        product_retailer_id: options
                            .product_retailer_id
                            .clone()
                            .unwrap_or_default(),
                    },
                },
            },
        )
    }

    pub fn product_list(
        to: impl Into<String>,
        catalog_id: impl Into<String>,
        header: impl Into<String>,
        body: impl Into<String>,
        sections: Vec<ProductSection>,
        footer_text: Option<&str>,
    ) -> Self {
        Self::new(
            to,
            None,
            OutgoingContent::Interactive {
                interactive: Interactive::ProductList {
                    header: InteractiveHeader::Text {
                        text: header.into(),
                    },
                    body: TextObject::new(body),
                    footer: TextObject::footer(footer_text),
                    action: ProductListAction {
                        catalog_id: catalog_id.into(),
                        sections: sections.into_iter().map(Into::into).collect(),
                    },
                },
            },
        )
    }

    pub fn catalog(to: impl Into<String>, body: impl Into<String>, options: &CatalogOptions) -> Self {
        let parameters = options
            .thumbnail_product_retailer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| CatalogParameters {
                thumbnail_product_retailer_id: id.to_string(),
            });

        Self::new(
            to,
            None,
            OutgoingContent::Interactive {
                interactive: Interactive::CatalogMessage {
                    body: TextObject::new(body),
                    footer: TextObject::footer(options.footer_text.as_deref()),
                    action: CatalogAction {
                        name: "catalog_message".to_string(),
                        parameters,
                    },
                },
            },
        )
    }
}

/// Response from WhatsApp API after sending a message
#[derive(Debug, Default, Deserialize)]
pub struct WhatsAppMessageResponse {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub contacts: Option<Vec<ResponseContact>>,
    #[serde(default)]
    pub messages: Option<Vec<ResponseMessage>>,
}

/// Contact information in response
#[derive(Debug, Deserialize)]
pub struct ResponseContact {
    /// Input phone number
    #[serde(default)]
    pub input: Option<String>,
    /// WhatsApp ID
    #[serde(default)]
    pub wa_id: Option<String>,
}

/// Message information in response
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub id: Option<String>,
}

/// What a successful send returns to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResult {
    /// `wamid` of the sent message; statuses refer to it
    pub message_id: Option<String>,
    /// Phone number as it was given in `to`
    pub phone_number: Option<String>,
    pub whatsapp_id: Option<String>,
}

impl From<WhatsAppMessageResponse> for SendMessageResult {
    fn from(response: WhatsAppMessageResponse) -> Self {
        let message = response.messages.and_then(|m| m.into_iter().next());
        let contact = response.contacts.and_then(|c| c.into_iter().next());

        Self {
            message_id: message.and_then(|m| m.id),
            phone_number: contact.as_ref().and_then(|c| c.input.clone()),
            whatsapp_id: contact.and_then(|c| c.wa_id),
        }
    }
}
