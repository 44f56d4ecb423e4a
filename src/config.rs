//! Configuration management for spotauth.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Real environment variables win over the
//! file because `dotenv` never overrides a variable that is already set.

use std::{env, path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
    "playlist-read-private",
    "user-follow-read",
    "user-library-modify",
    "user-library-read",
    "user-read-email",
];

/// How long before expiry a token is considered stale.
pub const REFRESH_LOOKAHEAD_SECS: i64 = 5 * 60;

/// Timeout applied to every token endpoint request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `login` waits for the browser round trip.
pub const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(120);

const CLIENT_ID: &str = "SPOTIFY_API_AUTH_CLIENT_ID";
const CLIENT_SECRET: &str = "SPOTIFY_API_AUTH_CLIENT_SECRET";
const REDIRECT_URI: &str = "SPOTIFY_API_REDIRECT_URI";
const SCOPE: &str = "SPOTIFY_API_AUTH_SCOPE";
const AUTH_URL: &str = "SPOTIFY_API_AUTH_URL";
const TOKEN_URL: &str = "SPOTIFY_API_TOKEN_URL";
const SERVER_ADDRESS: &str = "SERVER_ADDRESS";

/// Loads environment variables from `<data_local_dir>/spotauth/.env`.
///
/// Creates the directory if needed. A missing `.env` file is not an error:
/// the variables may already be exported in the shell.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Root of everything spotauth writes to disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotauth");
    path
}

/// Everything the authority and the sign-in flow need to talk to Spotify.
#[derive(Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub server_address: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("server_address", &self.server_address)
            .finish()
    }
}

impl AuthConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let redirect_uri = required(REDIRECT_URI)?;
        if url::Url::parse(&redirect_uri).is_err() {
            return Err(ConfigError::Invalid {
                key: REDIRECT_URI,
                value: redirect_uri,
            });
        }

        let scopes = match get(SCOPE) {
            Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
            None => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(AuthConfig {
            client_id: required(CLIENT_ID)?,
            client_secret: required(CLIENT_SECRET)?,
            redirect_uri,
            scopes,
            auth_url: get(AUTH_URL).unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: get(TOKEN_URL).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            server_address: get(SERVER_ADDRESS)
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        })
    }
}

pub fn refresh_lookahead() -> chrono::Duration {
    chrono::Duration::seconds(REFRESH_LOOKAHEAD_SECS)
}
