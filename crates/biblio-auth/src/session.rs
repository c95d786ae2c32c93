//! Persisted session state
//!
//! Manages a JSON file holding the current login session: the `logueado`
//! flag, the username, and the access/refresh token pair. All writes use
//! atomic temp-file + rename to prevent corruption on crash. A tokio Mutex
//! serializes concurrent access from the request path and the refresh
//! continuation.
//!
//! The session file is the single source of truth for credential state.
//! A missing file means "logged out". Logout and terminal auth failures
//! remove the file entirely, the equivalent of clearing browser session
//! storage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// One login session.
///
/// Field names mirror the keys the catalog's web front-ends persist:
/// `logueado`, `usuario`, `accessToken`, `refreshToken`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Logged-in flag; gates every resource command
    pub logueado: bool,
    /// Username the session was established for
    pub usuario: String,
    /// Short-lived bearer token attached to catalog calls
    pub access_token: String,
    /// Longer-lived token used solely to obtain a new access token
    pub refresh_token: String,
}

/// Thread-safe session file manager.
///
/// The Mutex serializes all access. Reads clone the in-memory state, so the
/// request path doesn't block on a concurrent persist.
pub struct SessionStore {
    path: PathBuf,
    state: Mutex<Option<Session>>,
}

impl SessionStore {
    /// Load the session from the given file path.
    ///
    /// A missing file is not an error: it simply means nobody is logged in.
    /// The file is only created once `establish` runs.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading session file: {e}")))?;
            let session: Session = serde_json::from_str(&contents)
                .map_err(|e| Error::SessionParse(format!("parsing session file: {e}")))?;
            info!(path = %path.display(), usuario = %session.usuario, "loaded session");
            Some(session)
        } else {
            debug!(path = %path.display(), "no session file, starting logged out");
            None
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Get a clone of the current session, if any.
    pub async fn current(&self) -> Option<Session> {
        let state = self.state.lock().await;
        state.clone()
    }

    /// Whether a session with the `logueado` flag set exists.
    pub async fn is_logged_in(&self) -> bool {
        let state = self.state.lock().await;
        state.as_ref().is_some_and(|s| s.logueado)
    }

    /// Username of the current session, if logged in.
    pub async fn username(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.as_ref().map(|s| s.usuario.clone())
    }

    /// Current access token, if one is stored and non-empty.
    pub async fn access_token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state
            .as_ref()
            .map(|s| s.access_token.clone())
            .filter(|t| !t.is_empty())
    }

    /// Both tokens, only if both are present and non-empty.
    ///
    /// The refresh protocol refuses to run with a partial pair; callers
    /// treat `None` as "must re-authenticate".
    pub async fn credential_pair(&self) -> Option<(String, String)> {
        let state = self.state.lock().await;
        state.as_ref().and_then(|s| {
            if s.access_token.is_empty() || s.refresh_token.is_empty() {
                None
            } else {
                Some((s.access_token.clone(), s.refresh_token.clone()))
            }
        })
    }

    /// Start a new session after a successful login and persist it.
    pub async fn establish(
        &self,
        usuario: String,
        access_token: String,
        refresh_token: String,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = Session {
            logueado: true,
            usuario,
            access_token,
            refresh_token,
        };
        write_atomic(&self.path, &session).await?;
        info!(usuario = %session.usuario, "session established");
        *state = Some(session);
        Ok(())
    }

    /// Replace the access token after a successful refresh and persist.
    ///
    /// The refresh token is left untouched; the backend does not rotate it.
    /// Returns an error if nobody is logged in.
    pub async fn set_access_token(&self, access_token: String) -> Result<()> {
        let mut state = self.state.lock().await;
        let session = state.as_mut().ok_or(Error::NotLoggedIn)?;
        session.access_token = access_token;
        write_atomic(&self.path, session).await?;
        debug!("access token updated");
        Ok(())
    }

    /// Wipe all session state: drop the in-memory session and remove the file.
    ///
    /// Used by logout and by the terminal branch of the refresh protocol.
    /// Clearing an already-empty store is fine.
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(format!("removing session file: {e}"))),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write the session to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets file permissions to 0600 (owner read/write only) since
/// the file contains bearer tokens. The parent directory is created if it
/// does not exist yet.
async fn write_atomic(path: &Path, session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| Error::SessionParse(format!("serializing session: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("session path has no parent directory".into()))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Io(format!("creating session directory: {e}")))?;

    let tmp_path = dir.join(format!(".session.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp session file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting session file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp session file: {e}")))?;

    debug!(path = %path.display(), "persisted session");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn logged_in_store(dir: &tempfile::TempDir) -> SessionStore {
        let path = dir.path().join("session.json");
        let store = SessionStore::load(path).await.unwrap();
        store
            .establish("ana".into(), "at_1".into(), "rt_1".into())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn roundtrip_establish_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(path.clone()).await.unwrap();
        store
            .establish("ana".into(), "at_1".into(), "rt_1".into())
            .await
            .unwrap();

        // Load into a new store instance
        let store2 = SessionStore::load(path).await.unwrap();
        let session = store2.current().await.unwrap();
        assert!(session.logueado);
        assert_eq!(session.usuario, "ana");
        assert_eq!(session.access_token, "at_1");
        assert_eq!(session.refresh_token, "rt_1");
    }

    #[tokio::test]
    async fn missing_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(path.clone()).await.unwrap();
        assert!(!store.is_logged_in().await);
        assert!(store.current().await.is_none());
        // Loading must not create the file
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn wire_keys_match_session_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir).await;

        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["logueado"], true);
        assert_eq!(value["usuario"], "ana");
        assert_eq!(value["accessToken"], "at_1");
        assert_eq!(value["refreshToken"], "rt_1");
    }

    #[tokio::test]
    async fn set_access_token_keeps_refresh_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir).await;

        store.set_access_token("at_2".into()).await.unwrap();

        let session = store.current().await.unwrap();
        assert_eq!(session.access_token, "at_2");
        assert_eq!(session.refresh_token, "rt_1");

        // Persisted too
        let reloaded = SessionStore::load(store.path().to_path_buf()).await.unwrap();
        assert_eq!(reloaded.current().await.unwrap().access_token, "at_2");
    }

    #[tokio::test]
    async fn set_access_token_requires_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = SessionStore::load(path).await.unwrap();

        let result = store.set_access_token("at".into()).await;
        assert!(matches!(result, Err(Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn clear_removes_file_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir).await;
        assert!(store.path().exists());

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert!(!store.is_logged_in().await);
        assert!(store.credential_pair().await.is_none());

        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn credential_pair_requires_both_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        // Hand-write a session with an empty refresh token
        tokio::fs::write(
            &path,
            r#"{"logueado":true,"usuario":"ana","accessToken":"at_1","refreshToken":""}"#,
        )
        .await
        .unwrap();

        let store = SessionStore::load(path).await.unwrap();
        assert!(store.credential_pair().await.is_none());
        // The access token alone is still readable
        assert_eq!(store.access_token().await.unwrap(), "at_1");
    }

    #[tokio::test]
    async fn corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json {{").await.unwrap();

        let result = SessionStore::load(path).await;
        assert!(matches!(result, Err(Error::SessionParse(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = logged_in_store(&dir).await;

        let metadata = tokio::fs::metadata(store.path()).await.unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "session file must be 0600, got {mode:o}");
    }

    #[tokio::test]
    async fn establish_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("session.json");

        let store = SessionStore::load(path.clone()).await.unwrap();
        store
            .establish("ana".into(), "at".into(), "rt".into())
            .await
            .unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn concurrent_updates_dont_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(logged_in_store(&dir).await);

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set_access_token(format!("at_{i}")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // File must be a valid session whichever write landed last
        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        let session: Session = serde_json::from_str(&contents).unwrap();
        assert!(session.access_token.starts_with("at_"));
        assert_eq!(session.refresh_token, "rt_1");
    }
}
