//! Error types for authentication operations

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("session parse error: {0}")]
    SessionParse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("not logged in")]
    NotLoggedIn,
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
