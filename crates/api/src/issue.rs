use crate::error::Result;
use crate::request::RequestBuilder;
use crate::session::SessionAuthenticator;
use crate::transport::HttpRequest;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CREATED: u16 = 201;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewIssue {
    pub project: String,
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permitted_group: Option<String>,
}

impl NewIssue {
    pub fn new(project: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            summary: summary.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_permitted_group(mut self, group: impl Into<String>) -> Self {
        self.permitted_group = Some(group.into());
        self
    }
}

/// Issue operations over an authenticated session.
pub struct Issues<'a> {
    auth: &'a SessionAuthenticator,
    requests: &'a RequestBuilder,
}

impl<'a> Issues<'a> {
    pub fn new(auth: &'a SessionAuthenticator, requests: &'a RequestBuilder) -> Self {
        Self { auth, requests }
    }

    /// `PUT /rest/issue`. Returns `true` only when the server answers `201 Created`;
    /// a rejected request yields `false`.
    pub async fn create(&self, issue: &NewIssue) -> Result<bool> {
        let mut query = vec![
            ("project", Some(issue.project.as_str())),
            ("summary", Some(issue.summary.as_str())),
            ("description", Some(issue.description.as_str())),
        ];
        if let Some(group) = issue.permitted_group.as_deref() {
            query.push(("permittedGroup", Some(group)));
        }

        let url = self.requests.build_url("issue", Some(&query));
        let request = HttpRequest::put(url).headers(self.requests.build_headers(self.auth.state()));

        let response = match self.auth.transport().send(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(error = %err, "Issue creation rejected");
                return Ok(false);
            }
        };

        debug!(status = response.status, "Issue creation response");
        Ok(response.status == CREATED)
    }
}
