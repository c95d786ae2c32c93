//! Command-level errors

/// Errors raised before any network call leaves the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field}: '{value}' is in the future")]
    FutureDate { field: &'static str, value: String },

    #[error("not logged in; run `biblio-admin login` first")]
    NotLoggedIn,

    #[error("aborted")]
    Aborted,
}
