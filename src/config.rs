//! Configuration management for the playlist maker.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. All values are read once at startup into a [`Config`]
//! which is then shared with the HTTP handlers and the Spotify clients.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use url::Url;

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_SCOPE: &str = "playlist-modify-private";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_COOKIE_NAME: &str = "spotify-login-session";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SEARCH_CONCURRENCY: usize = 4;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Cannot prepare config directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Runtime configuration of the service.
///
/// `client_id`, `client_secret`, `redirect_uri` and `session_secret` are required;
/// everything else falls back to a default that talks to the real Spotify API.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub session_secret: String,
    pub server_address: String,
    pub cookie_name: String,
    pub auth_url: Url,
    pub token_url: String,
    pub api_url: String,
    pub http_timeout: Duration,
    pub search_concurrency: usize,
    pub session_ttl: Duration,
    pub static_dir: PathBuf,
}

/// Loads environment variables from `.env` files.
///
/// Creates the `playlist-maker` directory inside the platform-specific local data
/// directory if it doesn't exist, then loads `playlist-maker/.env` from there and
/// finally a `.env` from the working directory. Missing files are not an error;
/// variables that are already set in the process environment are never overridden.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/playlist-maker/.env`
/// - macOS: `~/Library/Application Support/playlist-maker/.env`
/// - Windows: `%LOCALAPPDATA%/playlist-maker/.env`
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the data directory cannot be created.
pub async fn load_env() -> Result<(), ConfigError> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlist-maker/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if dotenv::from_path(&path).is_ok() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
    dotenv::dotenv().ok();
    Ok(())
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails fast with [`ConfigError::Missing`] naming the first required variable
    /// that is absent, or [`ConfigError::Invalid`] for values that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let client_id = required("CLIENT_ID")?;
        let client_secret = required("CLIENT_SECRET")?;
        let redirect_uri = required("REDIRECT_URI")?;
        let session_secret = required("SESSION_SECRET")?;

        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} characters long"),
            });
        }

        parse_url(&redirect_uri, "REDIRECT_URI")?;

        let auth_url = parse_url(
            &get("SPOTIFY_AUTH_URL").unwrap_or_else(|| SPOTIFY_AUTH_URL.to_string()),
            "SPOTIFY_AUTH_URL",
        )?;
        let token_url = get("SPOTIFY_TOKEN_URL").unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string());
        parse_url(&token_url, "SPOTIFY_TOKEN_URL")?;
        let api_url = get("SPOTIFY_API_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| SPOTIFY_API_URL.to_string());
        parse_url(&api_url, "SPOTIFY_API_URL")?;

        let http_timeout_secs = positive_number(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?
            .map_or(DEFAULT_HTTP_TIMEOUT_SECS, |n| n as u64);
        let search_concurrency = positive_number(get("SEARCH_CONCURRENCY"), "SEARCH_CONCURRENCY")?
            .unwrap_or(DEFAULT_SEARCH_CONCURRENCY);
        let session_ttl_secs = positive_number(get("SESSION_TTL_SECS"), "SESSION_TTL_SECS")?
            .map_or(DEFAULT_SESSION_TTL_SECS, |n| n as u64);

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            session_secret,
            server_address: get("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            auth_url,
            token_url,
            api_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            search_concurrency,
            session_ttl: Duration::from_secs(session_ttl_secs),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        })
    }

    /// Whether the session cookie should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.redirect_uri.starts_with("https://")
    }
}

fn parse_url(raw: &str, name: &'static str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn positive_number(raw: Option<String>, name: &'static str) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
