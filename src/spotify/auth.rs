use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;

use crate::{
    api::CallbackState,
    config::{self, AuthConfig},
    error::AuthError,
    management::TokenAuthority,
    server::start_api_server,
    types::{SignInOutcome, TokenGrant, TokenResponse},
    utils, warning,
};

/// The token endpoint as seen by the authority.
///
/// One call is one round trip; implementations never retry.
#[async_trait]
pub trait TokenEndpoint: Send + Sync + 'static {
    async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError>;
}

/// `POST {token_url}` with a form body and client Basic credentials.
pub struct HttpTokenEndpoint {
    client: Client,
    token_url: String,
    authorization: String,
}

impl HttpTokenEndpoint {
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config::HTTP_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            token_url: config.token_url.clone(),
            authorization: utils::basic_authorization(&config.client_id, &config.client_secret),
        })
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn request_token(&self, grant: &TokenGrant) -> Result<TokenResponse, AuthError> {
        tracing::debug!(grant_type = grant.kind(), url = %self.token_url, "requesting token");

        let res = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, &self.authorization)
            .form(&grant.form())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                grant_type = grant.kind(),
                "token endpoint rejected request"
            );
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AuthError::Decode(e.to_string()))
    }
}

/// Builds the URL the user opens to grant access.
///
/// ```text
/// https://accounts.spotify.com/authorize?response_type=code&client_id=..
///     &scope=a%20b&redirect_uri=..&show_dialog=TRUE
/// ```
pub fn sign_in_url(config: &AuthConfig) -> String {
    format!(
        "{auth_url}?response_type=code&client_id={client_id}&scope={scope}\
         &redirect_uri={redirect_uri}&show_dialog=TRUE",
        auth_url = config.auth_url,
        client_id = utils::encode_query_value(&config.client_id),
        scope = utils::encode_query_value(&config.scopes.join(" ")),
        redirect_uri = utils::encode_query_value(&config.redirect_uri),
    )
}

/// Runs the interactive authorization-code sign-in.
///
/// 1. Starts the local callback server
/// 2. Opens the sign-in URL in the default browser
/// 3. Waits until the callback has exchanged the code, the server dies, or
///    [`config::SIGN_IN_TIMEOUT`] elapses
///
/// The credential itself is written by [`TokenAuthority::exchange_code`]
/// from inside the callback handler.
pub async fn sign_in(authority: TokenAuthority, config: &AuthConfig) -> crate::Res<()> {
    let outcome: Arc<Mutex<Option<SignInOutcome>>> = Arc::new(Mutex::new(None));
    let state = CallbackState::new(authority, Arc::clone(&outcome));

    let address = config.server_address.clone();
    let mut server = tokio::spawn(async move { start_api_server(&address, state).await });

    let url = sign_in_url(config);
    if webbrowser::open(&url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            url
        )
    }

    let result = tokio::select! {
        outcome = wait_for_sign_in(outcome, config::SIGN_IN_TIMEOUT) => outcome,
        served = &mut server => {
            return match served {
                Ok(Err(e)) => Err(e),
                Ok(Ok(())) => Err("callback server stopped before sign-in finished".into()),
                Err(e) => Err(e.into()),
            };
        }
    };
    server.abort();

    match result {
        Some(SignInOutcome::Succeeded) => Ok(()),
        Some(SignInOutcome::Failed(reason)) => Err(reason.into()),
        None => Err("sign-in timed out".into()),
    }
}

/// Polls the shared outcome slot until the callback fills it or `max_wait`
/// runs out.
pub async fn wait_for_sign_in(
    outcome: Arc<Mutex<Option<SignInOutcome>>>,
    max_wait: Duration,
) -> Option<SignInOutcome> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        if let Some(done) = outcome.lock().await.take() {
            return Some(done);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    None
}
