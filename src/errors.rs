use derive_more::{Display, Error};
use ntex::{http, web};

/// Rejections produced by the webhook endpoint.
///
/// Every rejection answers with an empty body; the reason is only logged.
#[derive(Debug, Display, Error)]
pub enum WebhookError {
    #[display("malformed webhook envelope: {_0}")]
    MalformedEnvelope(#[error(not(source))] String),
    #[display("webhook signature verification failed")]
    InvalidSignature,
    #[display("webhook subscription challenge rejected")]
    ChallengeRejected,
}

impl web::error::WebResponseError for WebhookError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        logfire::warn!("{error}", error = self.to_string());

        web::HttpResponse::build(self.status_code()).finish()
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            WebhookError::MalformedEnvelope(_) => http::StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature | WebhookError::ChallengeRejected => {
                http::StatusCode::FORBIDDEN
            }
        }
    }
}

/// Failure of an outbound send
#[derive(Debug, Display, Error)]
pub enum SendError {
    /// WhatsApp answered with a non success status; `body` is the provider's
    /// error payload as received (a JSON string when it was not JSON).
    #[display("WhatsApp API returned error status {status}: {body}")]
    Provider {
        status: u16,
        body: serde_json::Value,
    },
    /// The request never got a usable answer (connection, TLS, decoding, ...)
    #[display("WhatsApp API request failed: {_0}")]
    Transport(#[error(not(source))] String),
    /// The message could not be built before sending
    #[display("invalid outgoing message: {_0}")]
    InvalidMessage(#[error(not(source))] String),
}

impl SendError {
    /// Provider error body, when WhatsApp answered
    pub fn provider_body(&self) -> Option<&serde_json::Value> {
        match self {
            SendError::Provider { body, .. } => Some(body),
            _ => None,
        }
    }
}
