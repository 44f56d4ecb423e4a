//! Error types shared by the token authority, its transport and its store.

use thiserror::Error;

/// Failures surfaced by [`crate::management::TokenAuthority`].
///
/// `Clone` so a single refresh outcome can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token endpoint could not be reached or the request timed out.
    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    /// The token endpoint answered, but not with a token document.
    #[error("invalid token response: {0}")]
    Decode(String),

    /// The token endpoint answered with a non-success status.
    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// A refresh was needed but no refresh token is stored.
    #[error("no refresh token stored, sign in again")]
    MissingRefreshToken,

    /// No credential is held, or the session was signed out while waiting.
    #[error("not signed in")]
    SignedOut,

    /// The refresh task went away without reporting an outcome.
    #[error("token refresh was abandoned")]
    RefreshAbandoned,

    #[error("credential store failure: {0}")]
    Store(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.to_string())
    }
}

/// Failures reading or writing persisted credentials.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed credential file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures building an [`crate::config::AuthConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}
