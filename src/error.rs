use crate::{
    ext::auth::error::AuthError, form::DecodeError, handler::response::error::ResponseError,
    view::ViewError,
};
use hyper::StatusCode;
use thiserror::Error;

/// Failure returned by a handler or middleware.
///
/// Cancellation is not an error: a link that already wrote its response
/// returns `Ok(Flow::Cancelled)` instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode request: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to render view: {0}")]
    View(#[from] ViewError),

    #[error("failed to build response: {0}")]
    Response(#[from] ResponseError),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    /// Status the boundary answers with when this error reaches it.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Decode(DecodeError::PayloadTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Decode(DecodeError::UnsupportedContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Error::Decode(_) => StatusCode::BAD_REQUEST,
            Error::Auth(_) => StatusCode::UNAUTHORIZED,
            Error::View(_) | Error::Response(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
