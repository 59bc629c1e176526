//! Session authentication: cookie login and OAuth2 token exchange.

use crate::error::{ApiError, Result};
use crate::oauth::{OAuth2Config, TokenInfo, CLIENT_CREDENTIALS_GRANT};
use crate::request::RequestBuilder;
use crate::transport::{Headers, HttpRequest, Transport};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const LOGIN_PATH: &str = "user/login";
const LOGIN_OK: &str = "<login>ok</login>";

/// Login form fields, sent in the order given.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials(Vec<(String, String)>);

impl Credentials {
    pub fn new<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The `login`/`password` pair YouTrack's login form expects.
    pub fn login_password(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self(vec![
            ("login".to_string(), login.into()),
            ("password".to_string(), password.into()),
        ])
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|(key, _)| key))
            .finish()
    }
}

/// Authentication state of one client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Cookie string the jar held for the login URL after the last login.
    pub auth_cookie: Option<String>,
    pub access_token: Option<String>,
    pub token_type: Option<String>,
}

impl SessionState {
    pub fn with_token(token_type: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            auth_cookie: None,
            access_token: Some(access_token.into()),
            token_type: Some(token_type.into()),
        }
    }

    /// `Authorization` header value, present only once a token was obtained.
    pub fn authorization(&self) -> Option<String> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let token_type = self.token_type.as_deref().unwrap_or("Bearer");
        Some(format!("{token_type} {token}"))
    }
}

pub struct SessionAuthenticator {
    transport: Arc<dyn Transport>,
    requests: RequestBuilder,
    credentials: Credentials,
    oauth2: Option<OAuth2Config>,
    state: SessionState,
}

impl SessionAuthenticator {
    pub fn new(
        transport: Arc<dyn Transport>,
        requests: RequestBuilder,
        credentials: Credentials,
        oauth2: Option<OAuth2Config>,
    ) -> Self {
        Self {
            transport,
            requests,
            credentials,
            oauth2,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn current_headers(&self) -> Headers {
        self.requests.build_headers(&self.state)
    }

    /// Form login against `/rest/user/login`.
    ///
    /// The cookie string is captured even when the request fails. Returns
    /// `Ok(false)` only for a `<login>` body other than `ok`; an `<error>`
    /// payload or an unrecognized body is an error.
    pub async fn login(&mut self) -> Result<bool> {
        let url = self.requests.build_url(LOGIN_PATH, None);
        let request = HttpRequest::post(url.as_str()).form(self.credentials.pairs().to_vec());

        let result = self.transport.send(request).await;

        self.state.auth_cookie = self.transport.cookie_string(&url);
        debug!(
            has_cookie = self.state.auth_cookie.is_some(),
            "Captured session cookie after login"
        );

        let response = result?;
        debug!(body = %response.body, "Login response");

        classify_login_body(&response.body)
    }

    /// Client-credentials exchange against the configured token endpoint.
    pub async fn get_access_token(&mut self) -> Result<TokenInfo> {
        let oauth2 = self
            .oauth2
            .as_ref()
            .ok_or(ApiError::MissingConfig { field: "oauth2" })?;

        let request = HttpRequest::post(oauth2.url.as_str())
            .header("Accept", "application/json")
            .header("Authorization", oauth2.basic_authorization())
            .form([
                ("grant_type", CLIENT_CREDENTIALS_GRANT),
                ("scope", oauth2.scope.as_str()),
            ]);

        let response = self.transport.send(request).await?;
        let token: TokenInfo = serde_json::from_str(&response.body)?;

        debug!(
            token_type = ?token.token_type,
            expires_in = ?token.expires_in,
            "Obtained access token"
        );

        self.state.token_type = token.token_type.clone();
        self.state.access_token = token.access_token.clone();

        Ok(token)
    }
}

fn classify_login_body(body: &str) -> Result<bool> {
    let document = strip_xml_prolog(body.trim());

    if document == LOGIN_OK {
        return Ok(true);
    }

    if let Some(message) = element_text(document, "error") {
        return Err(ApiError::AuthenticationRejected {
            message: message.trim().to_string(),
        });
    }

    if element_text(document, "login").is_some() {
        return Ok(false);
    }

    Err(ApiError::UnexpectedResponse {
        body: body.to_string(),
    })
}

fn strip_xml_prolog(document: &str) -> &str {
    if document.starts_with("<?xml") {
        if let Some(end) = document.find("?>") {
            return document[end + 2..].trim_start();
        }
    }
    document
}

fn element_text<'a>(document: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let inner = document.strip_prefix(open.as_str())?;
    let end = inner.find(close.as_str())?;
    Some(&inner[..end])
}
