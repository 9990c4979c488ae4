pub const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_GRAPH_API_VERSION: &str = "v14.0";

pub const MESSAGING_PRODUCT: &str = "whatsapp";
pub const RECIPIENT_TYPE_INDIVIDUAL: &str = "individual";

pub const SIGNATURE_HEADER_NAME: &str = "X-Hub-Signature-256";
pub const SIGNATURE_PREFIX: &str = "sha256=";

pub const HUB_MODE_SUBSCRIBE: &str = "subscribe";

pub const DEFAULT_WEBHOOK_PATH: &str = "/";

