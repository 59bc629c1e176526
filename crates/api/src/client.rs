use crate::error::Result;
use crate::issue::Issues;
use crate::oauth::{OAuth2Config, TokenInfo};
use crate::request::{Query, RequestBuilder};
use crate::session::{Credentials, SessionAuthenticator, SessionState};
use crate::transport::{Headers, ReqwestTransport, Transport};
use std::sync::Arc;

/// One YouTrack session: a transport, its authenticator and a request builder.
pub struct YouTrackClient {
    auth: SessionAuthenticator,
    requests: RequestBuilder,
}

impl YouTrackClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        oauth2: Option<OAuth2Config>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(transport, base_url, credentials, oauth2))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        credentials: Credentials,
        oauth2: Option<OAuth2Config>,
    ) -> Self {
        let requests = RequestBuilder::new(base_url);
        let auth = SessionAuthenticator::new(transport, requests.clone(), credentials, oauth2);
        Self { auth, requests }
    }

    pub async fn login(&mut self) -> Result<bool> {
        self.auth.login().await
    }

    pub async fn get_access_token(&mut self) -> Result<TokenInfo> {
        self.auth.get_access_token().await
    }

    pub fn build_url(&self, path: &str, query: Option<&Query<'_>>) -> String {
        self.requests.build_url(path, query)
    }

    pub fn build_headers(&self) -> Headers {
        self.requests.build_headers(self.auth.state())
    }

    pub fn state(&self) -> &SessionState {
        self.auth.state()
    }

    pub fn issues(&self) -> Issues<'_> {
        Issues::new(&self.auth, &self.requests)
    }
}
