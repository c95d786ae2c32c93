//! Authenticated request path and single-flight token refresh
//!
//! `ApiClient` owns the refresh state explicitly (flag + waiter queue behind
//! one Mutex) instead of hiding it in a global, so every request path shares
//! a single auditable writer. The flag-check-and-set happens under the lock:
//! tokio tasks run in parallel, so the single-flight invariant cannot rely
//! on cooperative scheduling.
//!
//! Refresh protocol on 401:
//! - no usable credential pair → wipe session, terminal error, no refresh call
//! - refresh in flight → enqueue a oneshot waiter, await its outcome
//! - otherwise → own the refresh: call the endpoint, store the new token,
//!   drain all waiters with the result, clear the flag
//!
//! Each request retries at most once; a 401 on the replayed call is final.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use biblio_auth::session::SessionStore;
use biblio_auth::users;

use crate::error::{Error, Result};

/// Waiters receive either the fresh access token or the refresh failure
/// message, broadcast once when the in-flight refresh settles.
type RefreshOutcome = std::result::Result<String, String>;

/// Refresh state shared by every in-flight request.
///
/// Invariant: `waiters` is non-empty only while `in_flight` is true. The
/// flag is set by the first request that sees a 401 and cleared only after
/// the refresh attempt settles, so at most one refresh-endpoint call is
/// outstanding at any time.
#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Authenticated catalog client.
///
/// Cheap to share via `Arc`; all methods take `&self`.
pub struct ApiClient {
    http: reqwest::Client,
    session: Arc<SessionStore>,
    auth_base_url: String,
    refresh: Mutex<RefreshState>,
}

impl ApiClient {
    /// Create a client around a session store.
    ///
    /// `auth_base_url` is the host of the user service, where the refresh
    /// endpoint lives.
    pub fn new(http: reqwest::Client, session: Arc<SessionStore>, auth_base_url: String) -> Self {
        Self {
            http,
            session,
            auth_base_url,
            refresh: Mutex::new(RefreshState::default()),
        }
    }

    /// The session store backing this client.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The underlying HTTP client (for the unauthenticated user endpoints).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Issue an authenticated request, refreshing the token once on 401.
    ///
    /// Returns the raw response for 2xx statuses. All other statuses map to
    /// errors; only a 401 on the first attempt engages the refresh protocol.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let token = self.session.access_token().await;
        let response = self.send(method.clone(), url, body, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        debug!(%method, url, "401 from catalog, running refresh protocol");
        let fresh = self.fresh_access_token().await?;

        // Single replay with the new token. Another 401 here is final:
        // re-queueing would allow unbounded retry loops.
        let retry = self.send(method, url, body, Some(&fresh)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            let message = read_error_message(retry).await;
            warn!(url, "still unauthorized after refresh");
            return Err(Error::Unauthorized(message));
        }
        check_status(retry).await
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.request(Method::GET, url, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Decode(format!("decoding {url}: {e}")))
    }

    /// POST a JSON body, discarding the response payload.
    pub async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let value = to_value(body)?;
        self.request(Method::POST, url, Some(&value)).await?;
        Ok(())
    }

    /// PUT a JSON body, discarding the response payload.
    pub async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<()> {
        let value = to_value(body)?;
        self.request(Method::PUT, url, Some(&value)).await?;
        Ok(())
    }

    /// DELETE a resource.
    pub async fn delete(&self, url: &str) -> Result<()> {
        self.request(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Build and send one HTTP call, attaching the bearer token if present.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut builder = self.http.request(method, url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {url} failed: {e}")))
    }

    /// Obtain a fresh access token, joining an in-flight refresh if one
    /// exists and starting one otherwise.
    async fn fresh_access_token(&self) -> Result<String> {
        // No usable pair: wipe the session and force re-authentication
        // without ever calling the refresh endpoint.
        let Some((access, refresh)) = self.session.credential_pair().await else {
            warn!("401 with missing credentials, clearing session");
            if let Err(e) = self.session.clear().await {
                warn!(error = %e, "failed to clear session");
            }
            return Err(Error::SessionExpired(
                "credentials missing; log in again".into(),
            ));
        };

        let waiter = {
            let mut state = self.refresh.lock().await;
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        // Queued behind the in-flight refresh: wait for its broadcast
        // outcome. Queued requests never re-check or re-trigger a refresh.
        if let Some(rx) = waiter {
            debug!("refresh already in flight, queueing");
            return match rx.await {
                Ok(Ok(token)) => Ok(token),
                Ok(Err(message)) => Err(Error::SessionExpired(message)),
                Err(_) => Err(Error::SessionExpired("refresh abandoned".into())),
            };
        }

        // This request owns the one refresh call.
        match users::refresh_token(&self.http, &self.auth_base_url, &access, &refresh).await {
            Ok(response) => {
                let token = response.access_token;
                if let Err(e) = self.session.set_access_token(token.clone()).await {
                    warn!(error = %e, "failed to persist refreshed token");
                }
                info!("access token refreshed");
                self.settle(Ok(token.clone())).await;
                Ok(token)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "token refresh failed, session terminated");
                self.settle(Err(message.clone())).await;
                if let Err(e) = self.session.clear().await {
                    warn!(error = %e, "failed to clear session");
                }
                Err(Error::SessionExpired(message))
            }
        }
    }

    /// Clear the in-flight flag and drain the waiter queue in one critical
    /// section, broadcasting the outcome to every queued request.
    async fn settle(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.refresh.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter whose caller stopped awaiting is fine to drop
            let _ = waiter.send(outcome.clone());
        }
    }
}

/// Map non-success statuses (other than the 401s handled upstream) to
/// `Error::Api`, surfacing the backend's error message.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = read_error_message(response).await;
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Read a failure body, preferring the backend's `{"error": "..."}` message.
async fn read_error_message(response: reqwest::Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<no body>"));
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(body)
}

fn to_value<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| Error::Decode(format!("serializing body: {e}")))
}
