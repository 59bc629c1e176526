//! OAuth2 client-credentials settings and token response.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuth2Config {
    /// Token endpoint, e.g. `https://example.myjetbrains.com/hub/api/rest/oauth2/token`.
    pub url: String,
    pub client_service_id: String,
    pub client_service_secret: String,
    pub scope: String,
}

impl OAuth2Config {
    /// `Basic base64(client_service_id:client_service_secret)`
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.client_service_id, self.client_service_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("url", &self.url)
            .field("client_service_id", &self.client_service_id)
            .field("client_service_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Parsed token endpoint response. Every field is optional and kept as sent;
/// unknown fields land in `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
