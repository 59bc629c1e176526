use crate::session::SessionState;
use crate::transport::Headers;

/// Ordered query parameters; a `None` value is sent as `key=`.
pub type Query<'a> = [(&'a str, Option<&'a str>)];

/// Builds REST URLs and header sets for one YouTrack instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBuilder {
    base_url: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// `<base_url>/rest/<path>`, followed by `?query` when one is given.
    pub fn build_url(&self, path: &str, query: Option<&Query<'_>>) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut url = format!("{}/rest/{}", self.base_url, path);

        if let Some(query) = query {
            url.push('?');
            url.push_str(&encode_query(query));
        }

        url
    }

    pub fn build_headers(&self, state: &SessionState) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "application/json".to_string());

        if let Some(authorization) = state.authorization() {
            headers.insert("Authorization".to_string(), authorization);
        }

        headers
    }
}

fn encode_query(query: &Query<'_>) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value.unwrap_or(""))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("my-base-url")
    }

    #[test]
    fn test_build_url_without_leading_slash() {
        assert_eq!(builder().build_url("issue", None), "my-base-url/rest/issue");
    }

    #[test]
    fn test_build_url_with_leading_slash() {
        assert_eq!(builder().build_url("/issue", None), "my-base-url/rest/issue");
    }

    #[test]
    fn test_build_url_with_parameters() {
        let url = builder().build_url("/issue", Some(&[("a", Some("b")), ("c", Some("d"))]));
        assert_eq!(url, "my-base-url/rest/issue?a=b&c=d");
    }

    #[test]
    fn test_build_url_with_null_parameter() {
        let url = builder().build_url(
            "/issue",
            Some(&[("a", Some("b")), ("c", Some("d")), ("e", None)]),
        );
        assert_eq!(url, "my-base-url/rest/issue?a=b&c=d&e=");
    }

    #[test]
    fn test_build_url_only_null_parameter() {
        let url = builder().build_url("issue", Some(&[("e", None)]));
        assert_eq!(url, "my-base-url/rest/issue?e=");
    }

    #[test]
    fn test_build_url_empty_query_keeps_question_mark() {
        let url = builder().build_url("issue", Some(&[]));
        assert_eq!(url, "my-base-url/rest/issue?");
    }

    #[test]
    fn test_build_url_encodes_values() {
        let url = builder().build_url(
            "issue",
            Some(&[("summary", Some("Fix login & logout")), ("project", Some("SP"))]),
        );
        assert_eq!(
            url,
            "my-base-url/rest/issue?summary=Fix%20login%20%26%20logout&project=SP"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_url_is_dropped() {
        let builder = RequestBuilder::new("https://hope.myjetbrains.com/youtrack/");
        assert_eq!(
            builder.build_url("issue", None),
            "https://hope.myjetbrains.com/youtrack/rest/issue"
        );
    }

    #[test]
    fn test_headers_on_fresh_state() {
        let headers = builder().build_headers(&SessionState::default());
        assert_eq!(headers.get("Accept").unwrap(), "application/json");
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn test_headers_with_access_token() {
        let state = SessionState::with_token("bar", "foo");
        let headers = builder().build_headers(&state);
        assert_eq!(headers.get("Authorization").unwrap(), "bar foo");
        assert_eq!(headers.get("Accept").unwrap(), "application/json");
    }

    #[test]
    fn test_cookie_only_state_adds_no_authorization() {
        let state = SessionState {
            auth_cookie: Some("JSESSIONID=abc".to_string()),
            ..Default::default()
        };
        let headers = builder().build_headers(&state);
        assert!(!headers.contains_key("Authorization"));
    }

    #[test]
    fn test_builders_are_pure() {
        let builder = builder();
        let state = SessionState::with_token("Bearer", "token");
        let query = [("a", Some("b")), ("e", None)];

        assert_eq!(
            builder.build_url("issue", Some(&query)),
            builder.build_url("issue", Some(&query))
        );
        assert_eq!(builder.build_headers(&state), builder.build_headers(&state));
    }
}
