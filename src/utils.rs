//! Helper functions shared by the webhook and the sender

use serde_json::Value;
use url::Url;

const URL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Follows JSON truthiness: `null`, `false`, `0` and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Tells apart a media link from a WhatsApp media object ID.
///
/// Accepts absolute `http`, `https` and `ftp` URLs, and scheme-less
/// hosts with a top level domain (`cdn.example.com/cat.png`). Media IDs
/// are plain digit strings, so they never qualify.
pub fn looks_like_url(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return false;
    }

    if let Ok(url) = Url::parse(candidate) {
        return URL_SCHEMES.contains(&url.scheme())
            && url.host_str().is_some_and(|host| !host.is_empty());
    }

    if candidate.contains("://") {
        return false;
    }

    Url::parse(&format!("http://{candidate}"))
        .ok()
        .and_then(|url| url.host_str().map(has_top_level_domain))
        .unwrap_or(false)
}

fn has_top_level_domain(host: &str) -> bool {
    match host.rsplit_once('.') {
        Some((name, tld)) => {
            !name.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("whatsapp_business_account")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(1)));
    }

    #[test]
    fn test_looks_like_url_accepts_links() {
        assert!(looks_like_url("https://example.com/cat.png"));
        assert!(looks_like_url("http://cdn.example.org/doc.pdf?sig=abc"));
        assert!(looks_like_url("ftp://files.example.com/a.mp3"));
        assert!(looks_like_url("cdn.example.com/cat.png"));
    }

    #[test]
    fn test_looks_like_url_rejects_media_ids() {
        assert!(!looks_like_url("1234567890123456"));
        assert!(!looks_like_url(""));
        assert!(!looks_like_url("not a url"));
        assert!(!looks_like_url("mailto:someone@example.com"));
        assert!(!looks_like_url("localhost/file"));
        assert!(!looks_like_url("192.168.0.1"));
    }
}
