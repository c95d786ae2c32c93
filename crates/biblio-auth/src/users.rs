//! Calls against the catalog's user service
//!
//! Handles the four unauthenticated endpoints: login, register,
//! forgot-password and refresh-token. All of them POST JSON bodies; none of
//! them takes an Authorization header (the refresh call carries both tokens
//! in the body instead).
//!
//! The backend reports failures as `{"error": "..."}` bodies; that message
//! is surfaced to the caller when present.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{FORGOT_PASSWORD_PATH, LOGIN_PATH, REFRESH_TOKEN_PATH, REGISTER_PATH};
use crate::error::{Error, Result};

/// Login request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token pair returned by a successful login.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// Registration request body. The secret answer backs password recovery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub respuesta_secreta: String,
}

/// Password-recovery request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub username: String,
    pub respuesta_secreta: String,
    pub nueva_password: String,
}

/// Refresh request body: the expired access token plus the refresh token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    access_token: &'a str,
    refresh_token: &'a str,
}

/// Response from the refresh endpoint.
///
/// Only a new access token comes back; the refresh token is not rotated
/// and stays valid until logout.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
}

/// Exchange username/password for a token pair.
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    request: &LoginRequest,
) -> Result<LoginResponse> {
    let response = client
        .post(join(base_url, LOGIN_PATH))
        .json(request)
        .send()
        .await
        .map_err(|e| Error::Http(format!("login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        if status.as_u16() == 401 {
            return Err(Error::InvalidCredentials(error_message(&body)));
        }
        return Err(Error::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    debug!(username = %request.username, "login accepted");
    response
        .json::<LoginResponse>()
        .await
        .map_err(|e| Error::Http(format!("invalid login response: {e}")))
}

/// Create a new account.
pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    request: &RegisterRequest,
) -> Result<()> {
    let response = client
        .post(join(base_url, REGISTER_PATH))
        .json(request)
        .send()
        .await
        .map_err(|e| Error::Http(format!("register request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        return Err(Error::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(())
}

/// Reset a password via the secret answer.
pub async fn forgot_password(
    client: &reqwest::Client,
    base_url: &str,
    request: &ForgotPasswordRequest,
) -> Result<()> {
    let response = client
        .post(join(base_url, FORGOT_PASSWORD_PATH))
        .json(request)
        .send()
        .await
        .map_err(|e| Error::Http(format!("forgot-password request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;
        return Err(Error::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    Ok(())
}

/// Obtain a new access token from the refresh endpoint.
///
/// Called reactively when a catalog call comes back 401. A 401/403 here
/// means the refresh token itself is dead and the session is over.
pub async fn refresh_token(
    client: &reqwest::Client,
    base_url: &str,
    access_token: &str,
    refresh_token: &str,
) -> Result<RefreshTokenResponse> {
    let response = client
        .post(join(base_url, REFRESH_TOKEN_PATH))
        .json(&RefreshTokenRequest {
            access_token,
            refresh_token,
        })
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = read_body(response).await;

        // 401/403 means the refresh token is revoked or invalid
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "refresh token rejected ({status}): {}",
                error_message(&body)
            )));
        }

        return Err(Error::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    response
        .json::<RefreshTokenResponse>()
        .await
        .map_err(|e| Error::Http(format!("invalid refresh response: {e}")))
}

/// Join a base URL and an endpoint path.
fn join(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"))
}

/// Pull the backend's `{"error": "..."}` message out of a failure body,
/// falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
