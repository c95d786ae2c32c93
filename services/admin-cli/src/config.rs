//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! Every field has a default matching the hosted backend, so the console
//! runs without a config file at all; an explicitly named file that cannot
//! be read is still an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use biblio_auth::constants::DEFAULT_AUTH_BASE_URL;
use biblio_client::autores::DEFAULT_AUTORES_BASE_URL;
use biblio_client::libros::DEFAULT_LIBROS_BASE_URL;

/// Root configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

/// Remote service endpoints. The catalog backend is split across three
/// hosts: users/auth, authors, and materials.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub auth_base_url: String,
    pub autores_base_url: String,
    pub libros_base_url: String,
    pub timeout_secs: u64,
}

/// Where the login session is persisted
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_base_url: DEFAULT_AUTH_BASE_URL.into(),
            autores_base_url: DEFAULT_AUTORES_BASE_URL.into(),
            libros_base_url: DEFAULT_LIBROS_BASE_URL.into(),
            timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

/// `$HOME/.config/biblio-admin/session.json`, or a file in the working
/// directory when HOME is unset.
fn default_session_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join("biblio-admin")
            .join("session.json"),
        None => PathBuf::from("biblio-admin-session.json"),
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment
    /// variables.
    ///
    /// `explicit` marks a path the user named via `--config` or
    /// `CONFIG_PATH`: such a path must exist. The default path is allowed
    /// to be absent, in which case built-in defaults apply.
    pub fn load(path: &Path, explicit: bool) -> common::Result<Self> {
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else if explicit {
            return Err(common::Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        } else {
            Config::default()
        };

        for (name, url) in [
            ("auth_base_url", &config.api.auth_base_url),
            ("autores_base_url", &config.api.autores_base_url),
            ("libros_base_url", &config.api.libros_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(common::Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        // Session file override for scripted use
        if let Ok(file) = std::env::var("BIBLIO_SESSION_FILE") {
            if !file.is_empty() {
                config.session.file = PathBuf::from(file);
            }
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    ///
    /// Returns the path and whether it was explicitly requested.
    pub fn resolve_path(cli_path: Option<&Path>) -> (PathBuf, bool) {
        if let Some(p) = cli_path {
            return (p.to_path_buf(), true);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from("biblio-admin.toml"), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn valid_toml() -> &'static str {
        r#"
[api]
auth_base_url = "https://auth.example.com"
autores_base_url = "https://autores.example.com"
libros_base_url = "https://libros.example.com"
timeout_secs = 10

[session]
file = "/tmp/biblio-session.json"
"#
    }

    #[test]
    fn load_valid_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("BIBLIO_SESSION_FILE") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        let config = Config::load(&path, true).unwrap();
        assert_eq!(config.api.auth_base_url, "https://auth.example.com");
        assert_eq!(config.api.autores_base_url, "https://autores.example.com");
        assert_eq!(config.api.libros_base_url, "https://libros.example.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.file, PathBuf::from("/tmp/biblio-session.json"));
    }

    #[test]
    fn missing_default_path_falls_back_to_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("BIBLIO_SESSION_FILE") };
        let config = Config::load(Path::new("/nonexistent/biblio-admin.toml"), false).unwrap();
        assert_eq!(config.api.auth_base_url, DEFAULT_AUTH_BASE_URL);
        assert_eq!(config.api.autores_base_url, DEFAULT_AUTORES_BASE_URL);
        assert_eq!(config.api.libros_base_url, DEFAULT_LIBROS_BASE_URL);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = Config::load(Path::new("/nonexistent/biblio-admin.toml"), true);
        assert!(result.is_err());
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("BIBLIO_SESSION_FILE") };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load(&path, true).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.auth_base_url, DEFAULT_AUTH_BASE_URL);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{{{ toml").unwrap();

        let result = Config::load(&path, true);
        assert!(result.is_err());
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nauth_base_url = \"auth.example.com\"\n").unwrap();

        let result = Config::load(&path, true);
        assert!(result.is_err(), "URL without scheme must be rejected");
        let err = format!("{}", result.unwrap_err());
        assert!(
            err.contains("auth_base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 0\n").unwrap();

        let result = Config::load(&path, true);
        assert!(result.is_err(), "timeout_secs = 0 must be rejected");
    }

    #[test]
    fn session_file_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, valid_toml()).unwrap();

        unsafe { set_env("BIBLIO_SESSION_FILE", "/tmp/other-session.json") };
        let config = Config::load(&path, true).unwrap();
        assert_eq!(
            config.session.file,
            PathBuf::from("/tmp/other-session.json"),
            "BIBLIO_SESSION_FILE must take precedence over the config file"
        );
        unsafe { remove_env("BIBLIO_SESSION_FILE") };
    }

    #[test]
    fn resolve_path_cli_arg() {
        let (path, explicit) = Config::resolve_path(Some(Path::new("/custom/path.toml")));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
        assert!(explicit);
    }

    #[test]
    fn resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let (path, explicit) = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        assert!(explicit);
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let (path, explicit) = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("biblio-admin.toml"));
        assert!(!explicit);
    }

    #[test]
    fn resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let (path, _) = Config::resolve_path(Some(Path::new("/cli/wins.toml")));
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
