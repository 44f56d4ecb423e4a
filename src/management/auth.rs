use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{Mutex, oneshot};

use crate::{
    config::{self, AuthConfig},
    error::AuthError,
    management::{CredentialStore, FileCredentialStore},
    spotify::auth::{HttpTokenEndpoint, TokenEndpoint},
    types::{AuthState, Credential, TokenGrant},
    utils::{self, Clock, SystemClock},
};

type Waiter = oneshot::Sender<Result<String, AuthError>>;

/// Owns the signed-in credential and hands out bearer tokens.
///
/// Cloning is cheap and every clone talks to the same session, so one
/// authority is built at startup and passed to whatever needs tokens.
///
/// At most one refresh round trip is outstanding at any time. Callers that
/// arrive while it runs wait for its outcome; every one of them gets the
/// same token, or the same error.
#[derive(Clone)]
pub struct TokenAuthority {
    inner: Arc<Inner>,
}

struct Inner {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    redirect_uri: String,
    lookahead: Duration,
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    credential: Option<Credential>,
    // Some while a refresh is outstanding
    in_flight: Option<Vec<Waiter>>,
    // bumped by every exchange and sign-out
    epoch: u64,
}

enum Plan {
    Ready(String),
    Wait(oneshot::Receiver<Result<String, AuthError>>),
}

impl TokenAuthority {
    /// Creates a signed-out authority.
    pub fn new(
        redirect_uri: impl Into<String>,
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_session(redirect_uri.into(), endpoint, store, clock, None)
    }

    /// Creates an authority seeded with whatever `store` currently holds.
    pub async fn restore(
        redirect_uri: impl Into<String>,
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        let credential = store.load().await?;
        tracing::debug!(signed_in = credential.is_some(), "restored credential");
        Ok(Self::with_session(
            redirect_uri.into(),
            endpoint,
            store,
            clock,
            credential,
        ))
    }

    /// Production wiring: HTTP endpoint, file store, system clock.
    pub async fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let endpoint = HttpTokenEndpoint::new(config)?;
        Self::restore(
            config.redirect_uri.clone(),
            Arc::new(endpoint),
            Arc::new(FileCredentialStore::default_location()),
            Arc::new(SystemClock),
        )
        .await
    }

    fn with_session(
        redirect_uri: String,
        endpoint: Arc<dyn TokenEndpoint>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        credential: Option<Credential>,
    ) -> Self {
        TokenAuthority {
            inner: Arc::new(Inner {
                endpoint,
                store,
                clock,
                redirect_uri,
                lookahead: config::refresh_lookahead(),
                session: Mutex::new(Session {
                    credential,
                    ..Session::default()
                }),
            }),
        }
    }

    /// Trades an authorization code for the session's first credential.
    ///
    /// The credential is persisted before it becomes visible. On any failure
    /// the previous session, signed out or not, is left exactly as it was.
    /// Callers waiting on a refresh of the previous session receive the new
    /// token.
    pub async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        let grant = TokenGrant::AuthorizationCode {
            code: code.to_string(),
            redirect_uri: self.inner.redirect_uri.clone(),
        };

        let response = self
            .inner
            .endpoint
            .request_token(&grant)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "authorization code exchange failed"))?;

        let credential = Credential::from_response(response, self.inner.clock.now());
        let token = credential.access_token.clone();

        let mut session = self.inner.session.lock().await;
        self.inner.store.save(&credential).await?;
        session.credential = Some(credential);
        session.epoch += 1;

        // the outstanding refresh belonged to the old session
        if let Some(waiters) = session.in_flight.take() {
            settle(waiters, Ok(token));
        }

        tracing::info!("signed in");
        Ok(())
    }

    /// Returns an access token that is not about to expire.
    ///
    /// - refresh outstanding: waits for it
    /// - token fresh: returns it without I/O
    /// - token stale: starts the refresh and waits for it
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        let waiter = {
            let mut session = self.inner.session.lock().await;
            match self.plan(&mut session)? {
                Plan::Ready(token) => return Ok(token),
                Plan::Wait(rx) => rx,
            }
        };

        waiter.await.map_err(|_| AuthError::RefreshAbandoned)?
    }

    /// `Bearer <token>` for the `Authorization` header of an API request.
    pub async fn bearer_header(&self) -> Result<String, AuthError> {
        let token = self.get_valid_token().await?;
        Ok(format!("Bearer {token}"))
    }

    /// Refreshes the access token if it is stale.
    ///
    /// A fresh token makes this a no-op, and an outstanding refresh is joined
    /// rather than duplicated.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        self.get_valid_token().await.map(|_| ())
    }

    /// Forgets the session locally. The token is not revoked with Spotify.
    ///
    /// Callers waiting on an outstanding refresh are failed with
    /// [`AuthError::SignedOut`], and that refresh's result is discarded.
    pub async fn sign_out(&self) {
        let mut session = self.inner.session.lock().await;
        session.credential = None;
        session.epoch += 1;

        if let Some(waiters) = session.in_flight.take() {
            settle(waiters, Err(AuthError::SignedOut));
        }

        if let Err(e) = self.inner.store.clear().await {
            tracing::warn!(error = %e, "failed to clear stored credential");
        }

        tracing::info!("signed out");
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.session.lock().await.credential.is_some()
    }

    pub async fn state(&self) -> AuthState {
        let session = self.inner.session.lock().await;
        match &session.credential {
            None => AuthState::SignedOut,
            Some(_) if session.in_flight.is_some() => AuthState::Refreshing,
            Some(c) if self.is_stale(c) => AuthState::Stale,
            Some(_) => AuthState::Valid,
        }
    }

    /// Snapshot of the current credential.
    pub async fn credential(&self) -> Option<Credential> {
        self.inner.session.lock().await.credential.clone()
    }

    /// Callers currently waiting on the outstanding refresh.
    pub async fn pending_callers(&self) -> usize {
        self.inner
            .session
            .lock()
            .await
            .in_flight
            .as_ref()
            .map_or(0, Vec::len)
    }

    fn is_stale(&self, credential: &Credential) -> bool {
        utils::is_stale(
            credential.expires_at,
            self.inner.clock.now(),
            self.inner.lookahead,
        )
    }

    // Runs under the session lock, which makes Stale -> Refreshing a
    // single check-and-set.
    fn plan(&self, session: &mut Session) -> Result<Plan, AuthError> {
        if let Some(waiters) = session.in_flight.as_mut() {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            tracing::debug!(waiting = waiters.len(), "joined outstanding refresh");
            return Ok(Plan::Wait(rx));
        }

        let credential = session.credential.as_ref().ok_or(AuthError::SignedOut)?;
        if !self.is_stale(credential) {
            return Ok(Plan::Ready(credential.access_token.clone()));
        }

        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or(AuthError::MissingRefreshToken)?;

        let (tx, rx) = oneshot::channel();
        session.in_flight = Some(vec![tx]);

        let inner = Arc::clone(&self.inner);
        let epoch = session.epoch;
        tokio::spawn(async move { inner.run_refresh(refresh_token, epoch).await });

        Ok(Plan::Wait(rx))
    }
}

impl Inner {
    // Spawned, so dropping the caller that triggered it cannot strand the
    // other waiters.
    async fn run_refresh(self: Arc<Self>, refresh_token: String, epoch: u64) {
        tracing::info!("refreshing access token");

        let endpoint = Arc::clone(&self.endpoint);
        let grant = TokenGrant::RefreshToken { refresh_token };
        let result = tokio::spawn(async move { endpoint.request_token(&grant).await })
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "refresh request task failed");
                Err(AuthError::RefreshAbandoned)
            });

        let mut session = self.session.lock().await;
        // sign-out or a new exchange already answered this flight's waiters
        if session.epoch != epoch {
            tracing::debug!("session changed during refresh, discarding response");
            return;
        }
        let waiters = session.in_flight.take().unwrap_or_default();

        let outcome = match (result, session.credential.take()) {
            (Ok(response), Some(current)) => {
                let updated = current.merge(response, self.clock.now());
                if let Err(e) = self.store.save(&updated).await {
                    tracing::warn!(error = %e, "failed to persist refreshed credential");
                }
                let token = updated.access_token.clone();
                session.credential = Some(updated);
                Ok(token)
            }
            (Ok(_), None) => Err(AuthError::SignedOut),
            (Err(e), current) => {
                tracing::warn!(error = %e, "token refresh failed");
                session.credential = current;
                Err(e)
            }
        };

        tracing::debug!(
            waiters = waiters.len(),
            refreshed = outcome.is_ok(),
            "refresh settled"
        );
        settle(waiters, outcome);
    }
}

fn settle(waiters: Vec<Waiter>, outcome: Result<String, AuthError>) {
    for waiter in waiters {
        let _ = waiter.send(outcome.clone());
    }
}
