//! Command implementations
//!
//! Each subcommand is a thin view over the client crates: validate input,
//! call the service, render the result. Resource commands are gated on the
//! session's `logueado` flag before any network call.

pub mod auth;
pub mod autores;
pub mod libros;

use std::io::Write;
use std::sync::Arc;

use biblio_client::ApiClient;

use crate::config::Config;
use crate::error::Error;

/// Everything a command needs: the loaded config and the shared client.
pub struct Ctx {
    pub config: Config,
    pub client: Arc<ApiClient>,
}

impl Ctx {
    /// Gate for resource commands: fail before any network call when
    /// nobody is logged in.
    pub async fn ensure_logged_in(&self) -> Result<(), Error> {
        if self.client.session().is_logged_in().await {
            Ok(())
        } else {
            Err(Error::NotLoggedIn)
        }
    }
}

/// Map client failures to user-facing errors. Terminal auth failures get a
/// re-login instruction; everything else passes through.
pub fn describe(err: biblio_client::Error) -> anyhow::Error {
    match &err {
        biblio_client::Error::SessionExpired(_) | biblio_client::Error::Unauthorized(_) => {
            anyhow::anyhow!("{err}; run `biblio-admin login` to sign in again")
        }
        _ => anyhow::Error::new(err),
    }
}

/// Ask for confirmation on stdin unless `--yes` was passed.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<(), Error> {
    if assume_yes {
        return Ok(());
    }
    print!("{prompt} [y/N] ");
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).ok();
    if answer.trim().eq_ignore_ascii_case("y") {
        Ok(())
    } else {
        Err(Error::Aborted)
    }
}
