use spin_sdk::http::Response;
use std::fmt;
use thiserror::Error;

/// Failure taxonomy of the feed engine.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("write failed: {0:#}")]
    WriteFailed(#[source] anyhow::Error),
}

impl FeedError {
    pub fn not_found(what: impl Into<String>) -> Self {
        FeedError::NotFound(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        FeedError::InvalidOperation(what.into())
    }
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Tags store errors from a mutation as [`FeedError::WriteFailed`].
pub trait WriteContext<T> {
    fn write_failed(self, what: &str) -> FeedResult<T>;
}

impl<T> WriteContext<T> for anyhow::Result<T> {
    fn write_failed(self, what: &str) -> FeedResult<T> {
        self.map_err(|e| FeedError::WriteFailed(e.context(what.to_string())))
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalError(_) => 500,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        let body = serde_json::json!({ "error": err.message() }).to_string();
        Response::builder()
            .status(err.status())
            .header("Content-Type", "application/json")
            .body(body.into_bytes())
            .build()
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(msg) => ApiError::NotFound(msg),
            FeedError::InvalidOperation(msg) => ApiError::BadRequest(msg),
            FeedError::WriteFailed(e) => {
                tracing::error!(error = %format!("{:#}", e), "store write failed");
                ApiError::InternalError("Something went wrong.".to_string())
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
