use thiserror::Error;

/// Error types for authentication middleware
#[derive(Debug, Clone, PartialEq, Error, Eq)]
pub enum AuthError {
    #[error("No authentication token")]
    MissingToken,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Authentication token has an invalid length")]
    InvalidTokenLength,
    #[error("Malformed cookie header")]
    MalformedCookie,
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
