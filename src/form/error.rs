use thiserror::Error;

/// Why a posted body could not be turned into a form value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported content type `{0}`")]
    UnsupportedContentType(String),

    #[error("form body is not valid UTF-8")]
    InvalidUtf8,

    #[error("malformed form body: {0}")]
    Malformed(String),

    #[error("payload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl From<serde_urlencoded::de::Error> for DecodeError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}
