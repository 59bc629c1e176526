//! Session and request layer for the YouTrack REST API.
//!
//! [`SessionAuthenticator`] owns the authentication state (session cookie,
//! OAuth2 token) and [`RequestBuilder`] turns that state into URLs and
//! headers. [`YouTrackClient`] bundles both over a single [`Transport`].

pub mod client;
pub mod error;
pub mod issue;
pub mod oauth;
pub mod request;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::YouTrackClient;
pub use error::{ApiError, Result};
pub use issue::{Issues, NewIssue};
pub use oauth::{OAuth2Config, TokenInfo};
pub use request::{Query, RequestBuilder};
pub use session::{Credentials, SessionAuthenticator, SessionState};
pub use transport::{Headers, HttpRequest, HttpResponse, ReqwestTransport, Transport};
