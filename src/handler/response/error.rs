use hyper::header::{InvalidHeaderName, InvalidHeaderValue};
use thiserror::Error;

/// Failure while assembling a [`Response`](super::Response).
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("invalid status code: {0}")]
    InvalidStatusCode(u16),

    #[error("failed to serialize JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] InvalidHeaderName),

    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] InvalidHeaderValue),
}
