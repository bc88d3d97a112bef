use shared::{
    domain::{PageNumber, Username},
    error::ApiError,
};
use thiserror::Error;

/// Failure of a single gateway read. Messages are captured as text so the
/// error can live inside cloned session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("failed to build http client: {0}")]
    Setup(String),
    #[error("invalid api url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("server answered {}: {}", .0.status, .0.body)]
    Server(ApiError),
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl GatewayError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Server(api) => Some(api),
            _ => None,
        }
    }
}

/// Error surfaced to the rendering layer. None of these end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("could not load user {username}: {source}")]
    Summary {
        username: Username,
        source: GatewayError,
    },
    #[error("could not load page {page} of events for {username}: {source}")]
    Page {
        username: Username,
        page: PageNumber,
        source: GatewayError,
    },
}
