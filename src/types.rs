use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by the token endpoint for both grant types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub scope: String,
    pub token_type: String,
}

/// Grant sent to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    AuthorizationCode { code: String, redirect_uri: String },
    RefreshToken { refresh_token: String },
}

impl TokenGrant {
    /// Form fields in the order the token endpoint receives them.
    pub fn form(&self) -> Vec<(&'static str, &str)> {
        match self {
            TokenGrant::AuthorizationCode { code, redirect_uri } => vec![
                ("code", code.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ],
            TokenGrant::RefreshToken { refresh_token } => vec![
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TokenGrant::AuthorizationCode { .. } => "authorization_code",
            TokenGrant::RefreshToken { .. } => "refresh_token",
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("grant_type", &self.kind())
            .finish_non_exhaustive()
    }
}

/// The signed-in session's credential.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
    pub token_type: String,
}

impl Credential {
    /// Builds a credential from a fresh exchange.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Credential {
            expires_at: expiry(now, response.expires_in),
            access_token: response.access_token,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            scope: response.scope,
            token_type: response.token_type,
        }
    }

    /// Folds a refresh response into this credential.
    ///
    /// The stored refresh token survives when the response carries none.
    pub fn merge(self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        let refresh_token = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .or(self.refresh_token);

        Credential {
            expires_at: expiry(now, response.expires_in),
            access_token: response.access_token,
            refresh_token,
            scope: response.scope,
            token_type: response.token_type,
        }
    }
}

fn expiry(now: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let secs = i64::try_from(expires_in).unwrap_or(i64::MAX);
    now.checked_add_signed(Duration::seconds(secs))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Where the authority currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    Valid,
    Stale,
    Refreshing,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthState::SignedOut => "signed out",
            AuthState::Valid => "valid",
            AuthState::Stale => "stale",
            AuthState::Refreshing => "refreshing",
        };
        f.write_str(label)
    }
}

/// Result of the browser round trip, as reported by the callback handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Succeeded,
    Failed(String),
}
