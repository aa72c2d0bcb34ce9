use http::StatusCode;
use thiserror::Error;

use crate::enforcement::Rejection;

/// HTTP result type, T is typically a hyper::Response
/// HttpError is used to generate a synthetic error response
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// Describes things that can go wrong while handling a request
#[derive(Debug, Error, Clone)]
pub enum HttpError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Failed to get response from backend: {0}")]
    FailedToGetResponseFromBackend(String),
}

impl HttpError {
    /// Label used for the error metric
    pub fn error_type(&self) -> &'static str {
        match self {
            HttpError::Rejected(rejection) => rejection.reason(),
            HttpError::InvalidUri(_) => "invalid_uri",
            HttpError::FailedToGetResponseFromBackend(_) => "backend_error",
        }
    }
}

impl From<HttpError> for StatusCode {
    fn from(e: HttpError) -> StatusCode {
        match e {
            HttpError::Rejected(rejection) => rejection.status(),
            HttpError::InvalidUri(_) => StatusCode::BAD_REQUEST,
            HttpError::FailedToGetResponseFromBackend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
