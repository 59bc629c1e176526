//! HTTP transport seam.
//!
//! The session and operation layers only ever talk to a [`Transport`]. The
//! cookie jar lives behind the same trait, so a stub transport can stand in
//! for both the network and the jar in tests.

use crate::error::{ApiError, Result};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub type Headers = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            form: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn form<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.form = Some(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Anything that can carry a request to the server and remembers cookies.
///
/// Implementations reject non-2xx responses with [`ApiError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Serialized `Cookie` header value the jar would send to `url`.
    fn cookie_string(&self, url: &str) -> Option<String>;
}

/// Production transport: a reqwest client sharing one cookie jar.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    jar: Arc<Jar>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .user_agent(format!("youtrack-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(ApiError::RequestFailed)?;

        Ok(Self { client, jar })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = Url::parse(&request.url)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut req = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            req = req.form(form);
        }

        let response = req.send().await.map_err(ApiError::RequestFailed)?;
        let status = response.status();
        let body = response.text().await.map_err(ApiError::RequestFailed)?;

        debug!(status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn cookie_string(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.jar
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(str::to_owned))
    }
}
