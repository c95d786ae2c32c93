//! Authenticated client for the biblioteca catalog services
//!
//! Wraps outbound calls to the catalog's REST services, attaching the
//! session's bearer token and transparently refreshing it on 401 with a
//! single-flight protocol: concurrent requests that hit a 401 while a
//! refresh is underway queue behind the one in-flight refresh call and
//! replay with the new token once it settles.
//!
//! Request lifecycle:
//! 1. `ApiClient::request()` reads the access token and issues the call
//! 2. 2xx → response returned, nothing else happens
//! 3. 401 → the refresh protocol runs at most once for this request
//! 4. Refresh success → the original call replays with the new token
//! 5. Refresh failure or missing credentials → session wiped, terminal error
//!
//! Typed wrappers for the two catalog resources live in `autores` and
//! `libros`.

pub mod autores;
pub mod client;
pub mod error;
pub mod libros;

pub use client::ApiClient;
pub use error::{Error, Result};
