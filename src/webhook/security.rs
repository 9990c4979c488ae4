//! Security utilities for WhatsApp webhook verification
//!
//! Meta signs every webhook payload with HMAC-SHA256 keyed by the app
//! secret and sends it in the `X-Hub-Signature-256` header as
//! `sha256=<hex_signature>`.
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - The hex strings are compared in constant time
//! - The `sha256=` prefix is optional on our side; a bare hex digest is accepted too

use crate::consts;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// App secret used to check payload signatures, or an explicit opt-out
#[derive(Clone)]
pub enum WebhookSecret {
    Verify(String),
    /// Accept every payload. Only for local development or when the
    /// endpoint is protected some other way (e.g. Meta IP allow-listing).
    Disabled,
}

impl WebhookSecret {
    pub fn is_disabled(&self) -> bool {
        matches!(self, WebhookSecret::Disabled)
    }
}

impl From<Option<String>> for WebhookSecret {
    fn from(value: Option<String>) -> Self {
        value.map_or(WebhookSecret::Disabled, WebhookSecret::Verify)
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebhookSecret::Verify(_) => f.write_str("WebhookSecret::Verify(<redacted>)"),
            WebhookSecret::Disabled => f.write_str("WebhookSecret::Disabled"),
        }
    }
}

/// Joins every value of a repeated header with no separator.
///
/// Returns `None` when the header is absent or one of its values is not
/// valid UTF-8.
pub fn join_header_values<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut joined: Option<String> = None;
    for value in values {
        let value = std::str::from_utf8(value).ok()?;
        joined.get_or_insert_with(String::new).push_str(value);
    }
    joined
}

/// Lowercase hex HMAC-SHA256 of `payload` keyed by `app_secret`
pub fn signature_hex(app_secret: &str, payload: &[u8]) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return None;
        }
    };
    mac.update(payload);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies the X-Hub-Signature-256 header against the raw request payload
///
/// # Arguments
///
/// * `secret` - App secret, or [`WebhookSecret::Disabled`] to skip the check
/// * `payload` - The raw request body bytes
/// * `signature_header` - Header value (values joined, see [`join_header_values`])
///
/// # Returns
///
/// * `true` if verification is disabled or the signature matches
/// * `false` if the header is missing, empty or does not match
pub fn verify_signature(
    secret: &WebhookSecret,
    payload: &[u8],
    signature_header: Option<&str>,
) -> bool {
    let app_secret = match secret {
        WebhookSecret::Disabled => return true,
        WebhookSecret::Verify(app_secret) => app_secret,
    };

    let Some(signature_header) = signature_header else {
        logfire::warn!("Missing {header} header", header = consts::SIGNATURE_HEADER_NAME);
        return false;
    };

    let received = signature_header
        .strip_prefix(consts::SIGNATURE_PREFIX)
        .unwrap_or(signature_header);

    if received.is_empty() {
        logfire::warn!("Empty webhook signature");
        return false;
    }

    let Some(computed) = signature_hex(app_secret, payload) else {
        return false;
    };
    let is_valid: bool = computed.as_bytes().ct_eq(received.as_bytes()).into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}
