//! Authentication library for the biblioteca catalog API
//!
//! Provides the session store (persisted login state) and the calls against
//! the `/api/Users/*` endpoints: login, register, forgot-password and
//! refresh-token. This crate is a standalone library with no dependency on
//! the admin binary — it can be tested and used independently.
//!
//! Session flow:
//! 1. CLI calls `users::login()` with username and password
//! 2. Session stored via `session::SessionStore::establish()`
//! 3. The API client reads tokens via `SessionStore::credential_pair()`
//! 4. On 401 the client calls `users::refresh_token()` once
//! 5. New access token saved via `SessionStore::set_access_token()`
//! 6. Logout or a failed refresh wipes everything via `SessionStore::clear()`

pub mod constants;
pub mod error;
pub mod session;
pub mod users;

pub use constants::*;
pub use error::{Error, Result};
pub use session::{Session, SessionStore};
pub use users::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RefreshTokenResponse,
    forgot_password, login, refresh_token, register,
};
