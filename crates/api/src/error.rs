use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Authentication rejected: {message}")]
    AuthenticationRejected { message: String },

    #[error("Got unexpected response: {body}")]
    UnexpectedResponse { body: String },

    #[error("Malformed JSON response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: &'static str },
}

impl ApiError {
    /// Body of a rejected HTTP exchange, if the server sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } | ApiError::UnexpectedResponse { body } => Some(body),
            _ => None,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationRejected { .. } => {
                Some("Verify the stored password using: youtrack-cli auth test")
            }
            ApiError::Status { status: 401, .. } | ApiError::Status { status: 403, .. } => {
                Some("Log in again or request a fresh token with: youtrack-cli auth token")
            }
            ApiError::UnexpectedResponse { .. } => {
                Some("Check that base_url points at the YouTrack instance root")
            }
            ApiError::MissingConfig { .. } => Some("Add the missing value to your profile"),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
