//! Error types for catalog client operations

/// Errors from catalog client operations.
///
/// `SessionExpired` is terminal for the whole session: the stored
/// credentials are gone and the user must log in again. Everything else is
/// local to the single call that failed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unauthorized after token refresh: {0}")]
    Unauthorized(String),

    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
