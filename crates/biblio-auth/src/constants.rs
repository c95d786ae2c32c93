//! Endpoint paths for the catalog's user service
//!
//! Paths are relative to the auth service base URL, which is configurable.
//! The defaults point at the hosted backend the admin console was written
//! against.

/// Exchange username/password for an access and refresh token pair
pub const LOGIN_PATH: &str = "/api/Users/login";

/// Create a new account
pub const REGISTER_PATH: &str = "/api/Users/register";

/// Reset a password via the secret answer
pub const FORGOT_PASSWORD_PATH: &str = "/api/Users/forgot-password";

/// Exchange an expired access token plus refresh token for a new access token.
/// Takes no Authorization header; both tokens travel in the body.
pub const REFRESH_TOKEN_PATH: &str = "/api/Users/refresh-token";

/// Default host of the user/auth service
pub const DEFAULT_AUTH_BASE_URL: &str = "https://loginconectadotokenlibrosautores.somee.com";
