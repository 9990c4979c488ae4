//! WhatsApp webhook endpoint handlers
//!
//! Both endpoints live on the same path: GET answers the subscription
//! challenge, POST receives event deliveries.
//!
//! # Security
//!
//! Deliveries are rejected with 403 unless the `X-Hub-Signature-256`
//! header matches the HMAC of the raw body (see [`super::security`]).

use super::{WebhookState, handler, schemas, security};
use crate::{consts, errors::WebhookError};
use ntex::{util::Bytes, web};
use url::form_urlencoded;

/// Query parameters for webhook verification
#[derive(Debug, Default)]
pub struct VerifyQuery {
    /// `hub.mode`, should be "subscribe"
    pub mode: Option<String>,
    /// `hub.verify_token`, the verification token from WhatsApp
    pub verify_token: Option<String>,
    /// `hub.challenge`, the challenge string to echo back
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Reads the `hub.*` parameters out of a raw query string.
    ///
    /// Never fails: values are percent-decoded lossily, unknown keys are
    /// ignored and the first occurrence of a repeated key wins.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "hub.mode" => &mut parsed.mode,
                "hub.verify_token" => &mut parsed.verify_token,
                "hub.challenge" => &mut parsed.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        parsed
    }
}

/// Returns the challenge to echo back, or why the handshake is rejected.
///
/// Absent and empty parameters are treated alike.
pub fn challenge_response<'a>(
    query: &'a VerifyQuery,
    expected_token: &str,
) -> Result<&'a str, WebhookError> {
    let present = |param: &'a Option<String>| param.as_deref().filter(|v| !v.is_empty());

    let (Some(mode), Some(token), Some(challenge)) = (
        present(&query.mode),
        present(&query.verify_token),
        present(&query.challenge),
    ) else {
        return Err(WebhookError::ChallengeRejected);
    };

    if mode != consts::HUB_MODE_SUBSCRIBE || token != expected_token {
        return Err(WebhookError::ChallengeRejected);
    }

    Ok(challenge)
}

/// Webhook verification endpoint (GET)
///
/// # Returns
/// - 200 with challenge string if verification succeeds
/// - 403 with an empty body otherwise, whatever the query looks like
pub async fn verify(
    req: web::HttpRequest,
    state: web::types::State<WebhookState>,
) -> Result<web::HttpResponse, web::Error> {
    if state.log_all_requests {
        logfire::info!("Webhook GET {path}", path = req.path().to_string());
    }

    let query = VerifyQuery::from_query_string(req.query_string());
    let challenge = challenge_response(&query, &state.verify_token)?;

    logfire::info!("Webhook subscription verified");

    Ok(web::HttpResponse::Ok()
        .content_type("text/plain")
        .body(challenge.to_string()))
}

/// Webhook receiver endpoint (POST)
///
/// Processes the delivery synchronously and answers once every handler
/// call has settled. Handler failures never change the 200 answer.
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    state: web::types::State<WebhookState>,
) -> Result<web::HttpResponse, web::Error> {
    if state.log_all_requests {
        logfire::info!(
            "Webhook POST {path}: {body}",
            path = req.path().to_string(),
            body = String::from_utf8_lossy(&body).into_owned()
        );
    }

    let envelope = schemas::InboundEnvelope::from_slice(&body)?;

    let signature = security::join_header_values(
        req.headers()
            .get_all(consts::SIGNATURE_HEADER_NAME)
            .map(|value| value.as_bytes()),
    );
    if !security::verify_signature(&state.secret, &body, signature.as_deref()) {
        return Err(WebhookError::InvalidSignature.into());
    }

    let report = handler::process_webhook(&envelope, state.handler.as_ref()).await;

    logfire::debug!(
        "Webhook processed: {messages} messages, {statuses} statuses, {dropped} dropped, {failed} failed",
        messages = report.messages as i64,
        statuses = report.statuses as i64,
        dropped = report.dropped as i64,
        failed = report.failed as i64
    );

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "received"
    })))
}

/// Mounts both endpoints at the configured webhook path
pub fn whatsapp(state: WebhookState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let path = state.webhook_path.clone();
        cfg.service(
            web::resource(path)
                .state(state)
                .route(web::get().to(verify))
                .route(web::post().to(receive)),
        );
    }
}
