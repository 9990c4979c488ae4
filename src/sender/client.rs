//! # WhatsApp Message Sender
//!
//! Sends messages through the Graph API on behalf of one business phone
//! number.

use super::{
    logger::{LogfireResponseLogger, ResponseLogger, SendRecord},
    options::{
        CatalogOptions, InteractiveOptions, LocationOptions, MediaOptions, ProductOptions,
        ReplyOptions, TextOptions,
    },
    outgoing_schemas::{
        Contact, ListSection, OutgoingMessage, ProductSection, ReplyButton, SendMessageResult,
        TemplateComponent, WhatsAppMessageResponse,
    },
};
use crate::{consts, errors::SendError};
use reqwest::header;
use std::sync::Arc;

/// WhatsApp API client for sending messages
#[derive(Clone)]
pub struct MessageSender {
    /// HTTP client for making API requests
    client: reqwest::Client,
    base_url: String,
    graph_version: String,
    /// WhatsApp Business phone number ID messages are sent from
    from_phone_number_id: String,
    access_token: String,
    response_logger: Arc<dyn ResponseLogger>,
}

impl MessageSender {
    pub fn new(from_phone_number_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: consts::GRAPH_API_BASE_URL.to_string(),
            graph_version: consts::DEFAULT_GRAPH_API_VERSION.to_string(),
            from_phone_number_id: from_phone_number_id.into(),
            access_token: access_token.into(),
            response_logger: Arc::new(LogfireResponseLogger),
        }
    }

    pub fn with_graph_version(mut self, graph_version: impl Into<String>) -> Self {
        self.graph_version = graph_version.into();
        self
    }

    /// Overrides `https://graph.facebook.com`
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_response_logger(mut self, response_logger: Arc<dyn ResponseLogger>) -> Self {
        self.response_logger = response_logger;
        self
    }

    pub fn from_phone_number_id(&self) -> &str {
        &self.from_phone_number_id
    }

    /// `{base}/{version}/{phone_number_id}/messages`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.graph_version, self.from_phone_number_id
        )
    }

    /// Sends a text message
    ///
    /// # Arguments
    /// * `to` - Recipient's WhatsApp ID (phone number with country code)
    /// * `text` - Message text
    pub async fn send_text(
        &self,
        to: &str,
        text: &str,
        options: TextOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::text(to, text, &options))
            .await
    }

    /// Same as [`MessageSender::send_text`]
    pub async fn send_message(
        &self,
        to: &str,
        text: &str,
        options: TextOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_text(to, text, options).await
    }

    /// Reacts to `message_id` with `emoji`; an empty emoji removes the reaction
    pub async fn send_reaction(
        &self,
        to: &str,
        emoji: &str,
        message_id: &str,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::reaction(to, emoji, message_id))
            .await
    }

    /// `url_or_id` is sent as `link` when it looks like a URL, as media `id` otherwise
    pub async fn send_image(
        &self,
        to: &str,
        url_or_id: &str,
        options: MediaOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::image(to, url_or_id, &options))
            .await
    }

    pub async fn send_document(
        &self,
        to: &str,
        url_or_id: &str,
        options: MediaOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::document(to, url_or_id, &options))
            .await
    }

    pub async fn send_audio(
        &self,
        to: &str,
        url_or_id: &str,
        options: ReplyOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::audio(to, url_or_id, &options))
            .await
    }

    pub async fn send_video(
        &self,
        to: &str,
        url_or_id: &str,
        options: MediaOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::video(to, url_or_id, &options))
            .await
    }

    pub async fn send_sticker(
        &self,
        to: &str,
        url_or_id: &str,
        options: ReplyOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::sticker(to, url_or_id, &options))
            .await
    }

    pub async fn send_location(
        &self,
        to: &str,
        latitude: f64,
        longitude: f64,
        options: LocationOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::location(
            to, latitude, longitude, &options,
        ))
        .await
    }

    /// Sends a pre-approved template
    ///
    /// Fails with [`SendError::InvalidMessage`] when a button component has
    /// an index above 2.
    pub async fn send_template(
        &self,
        to: &str,
        name: &str,
        language_code: &str,
        components: Option<Vec<TemplateComponent>>,
    ) -> Result<SendMessageResult, SendError> {
        let bad_index = components.iter().flatten().find_map(|component| match component {
            TemplateComponent::Button { index, .. }
                if *index > TemplateComponent::MAX_BUTTON_INDEX =>
            {
                Some(*index)
            }
            _ => None,
        });
        if let Some(index) = bad_index {
            return Err(SendError::InvalidMessage(format!(
                "template button index {index} is out of range 0-{}",
                TemplateComponent::MAX_BUTTON_INDEX
            )));
        }

        self.send_request(&OutgoingMessage::template(
            to,
            name,
            language_code,
            components,
        ))
        .await
    }

    /// Sends contact cards
    ///
    /// Fails with [`SendError::InvalidMessage`] when a card has no name part
    /// besides the formatted name.
    pub async fn send_contacts(
        &self,
        to: &str,
        contacts: Vec<Contact>,
        options: ReplyOptions,
    ) -> Result<SendMessageResult, SendError> {
        if let Some(contact) = contacts.iter().find(|c| !c.name.has_name_part()) {
            return Err(SendError::InvalidMessage(format!(
                "contact `{}` needs at least one of first, last, middle name, prefix or suffix",
                contact.name.formatted_name
            )));
        }

        self.send_request(&OutgoingMessage::contacts(to, contacts, &options))
            .await
    }

    /// Sends up to three quick reply buttons, in the given order
    pub async fn send_reply_buttons(
        &self,
        to: &str,
        body: &str,
        buttons: Vec<ReplyButton>,
        options: InteractiveOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::reply_buttons(to, body, buttons, &options))
            .await
    }

    /// Sends an interactive list message
    ///
    /// # Arguments
    /// * `button` - Text of the button that opens the list
    /// * `sections` - Titled groups of rows
    pub async fn send_list(
        &self,
        to: &str,
        button: &str,
        body: &str,
        sections: Vec<ListSection>,
        options: InteractiveOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::list(to, button, body, sections, &options))
            .await
    }

    pub async fn send_product(
        &self,
        to: &str,
        catalog_id: &str,
        options: ProductOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::product(to, catalog_id, &options))
            .await
    }

    pub async fn send_product_list(
        &self,
        to: &str,
        catalog_id: &str,
        header: &str,
        body: &str,
        sections: Vec<ProductSection>,
        footer_text: Option<&str>,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::product_list(
            to,
            catalog_id,
            header,
            body,
            sections,
            footer_text,
        ))
        .await
    }

    pub async fn send_catalog(
        &self,
        to: &str,
        body: &str,
        options: CatalogOptions,
    ) -> Result<SendMessageResult, SendError> {
        self.send_request(&OutgoingMessage::catalog(to, body, &options))
            .await
    }

    /// Internal method to send any message type to WhatsApp API
    async fn send_request(
        &self,
        message: &OutgoingMessage,
    ) -> Result<SendMessageResult, SendError> {
        let request_body = serde_json::to_value(message)
            .map_err(|e| SendError::InvalidMessage(e.to_string()))?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                logfire::error!(
                    "Failed to send request to WhatsApp API: {error}",
                    error = e.to_string()
                );
                SendError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| SendError::Transport(e.to_string()))?;
            let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

            logfire::error!(
                "WhatsApp API returned error status {status}: {body}",
                status = status.as_u16() as i64,
                body = body.to_string()
            );
            return Err(SendError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let whatsapp_response: WhatsAppMessageResponse = response
            .json()
            .await
            .map_err(|e| SendError::Transport(format!("invalid WhatsApp API response: {e}")))?;
        let result = SendMessageResult::from(whatsapp_response);

        let record = SendRecord {
            from_phone_number_id: self.from_phone_number_id.clone(),
            request_body,
            response_summary: result.clone(),
        };
        if let Err(e) = self.response_logger.log(&record).await {
            logfire::error!(
                "Response logger failed: {error}",
                error = format!("{e:#}")
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::{
        logger::MockResponseLogger,
        outgoing_schemas::{ButtonSubType, ContactName},
    };
    use serde_json::json;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    const PHONE_NUMBER_ID: &str = "10001";
    const TOKEN: &str = "EAAG-test-token";
    const TO: &str = "5215512345678";

    fn success_body() -> serde_json::Value {
        json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": TO, "wa_id": TO}],
            "messages": [{"id": "wamid.out"}]
        })
    }

    fn sender(server: &MockServer) -> MessageSender {
        let mut logger = MockResponseLogger::new();
        logger.expect_log().returning(|_| Ok(()));

        MessageSender::new(PHONE_NUMBER_ID, TOKEN)
            .with_base_url(server.uri())
            .with_response_logger(Arc::new(logger))
    }

    #[test]
    fn test_endpoint() {
        let sender = MessageSender::new(PHONE_NUMBER_ID, TOKEN);
        assert_eq!(
            sender.endpoint(),
            "https://graph.facebook.com/v14.0/10001/messages"
        );

        let sender = sender
            .with_base_url("http://localhost:9000/")
            .with_graph_version("v21.0");
        assert_eq!(sender.endpoint(), "http://localhost:9000/v21.0/10001/messages");
    }

    #[tokio::test]
    async fn test_send_text_posts_payload_and_returns_ids() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v14.0/10001/messages"))
            .and(matchers::header("authorization", "Bearer EAAG-test-token"))
            .and(matchers::header("accept", "application/json"))
            .and(matchers::body_json(json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": TO,
                "context": {"message_id": "wamid.in"},
                "type": "text",
                "text": {"body": "hola"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let options = TextOptions {
            reply: Some("wamid.in".to_string()),
            ..Default::default()
        };
        let result = sender(&server).send_text(TO, "hola", options).await.unwrap();

        assert_eq!(result.message_id.as_deref(), Some("wamid.out"));
        assert_eq!(result.phone_number.as_deref(), Some(TO));
        assert_eq!(result.whatsapp_id.as_deref(), Some(TO));
    }

    #[tokio::test]
    async fn test_provider_error_keeps_body() {
        let server = MockServer::start().await;
        let error_body = json!({
            "error": {
                "message": "(#131030) Recipient phone number not in allowed list",
                "type": "OAuthException",
                "code": 131030
            }
        });
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(error_body.clone()))
            .mount(&server)
            .await;

        let mut logger = MockResponseLogger::new();
        logger.expect_log().never();
        let sender = MessageSender::new(PHONE_NUMBER_ID, TOKEN)
            .with_base_url(server.uri())
            .with_response_logger(Arc::new(logger));

        let err = sender
            .send_reaction(TO, "\u{1f44d}", "wamid.in")
            .await
            .unwrap_err();

        match err {
            SendError::Provider { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, error_body);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_provider_error_with_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = sender(&server)
            .send_text(TO, "hola", TextOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.provider_body(), Some(&json!("Bad Gateway")));
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens on a port released right after binding it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = MessageSender::new(PHONE_NUMBER_ID, TOKEN)
            .with_base_url(format!("http://127.0.0.1:{port}"))
            .send_text(TO, "hola", TextOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_response_logger_receives_record() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let mut logger = MockResponseLogger::new();
        logger
            .expect_log()
            .withf(|record| {
                record.from_phone_number_id == PHONE_NUMBER_ID
                    && record.request_body["type"] == "image"
                    && record.request_body["image"]["link"] == "https://example.com/cat.png"
                    && record.response_summary.message_id.as_deref() == Some("wamid.out")
            })
            .times(1)
            .returning(|_| Ok(()));
        let sender = MessageSender::new(PHONE_NUMBER_ID, TOKEN)
            .with_base_url(server.uri())
            .with_response_logger(Arc::new(logger));

        sender
            .send_image(TO, "https://example.com/cat.png", MediaOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failing_logger_does_not_fail_send() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .mount(&server)
            .await;

        let mut logger = MockResponseLogger::new();
        logger
            .expect_log()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("database is down")));
        let sender = MessageSender::new(PHONE_NUMBER_ID, TOKEN)
            .with_base_url(server.uri())
            .with_response_logger(Arc::new(logger));

        let result = sender
            .send_location(TO, 19.43, -99.13, LocationOptions::default())
            .await
            .unwrap();

        assert_eq!(result.message_id.as_deref(), Some("wamid.out"));
    }

    #[tokio::test]
    async fn test_invalid_messages_are_not_sent() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(0)
            .mount(&server)
            .await;
        let sender = sender(&server);

        let nameless = Contact {
            name: ContactName {
                formatted_name: "Ana".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = sender
            .send_contacts(TO, vec![nameless], ReplyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::InvalidMessage(_)));

        let button = TemplateComponent::Button {
            sub_type: ButtonSubType::Url,
            index: 3,
            parameters: vec![],
        };
        let err = sender
            .send_template(TO, "order_update", "en_US", Some(vec![button]))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::InvalidMessage(_)));
    }
}
