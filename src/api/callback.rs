use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{management::TokenAuthority, types::SignInOutcome, warning};

/// Shared between the callback handler and the waiting `login` command.
#[derive(Clone)]
pub struct CallbackState {
    pub authority: TokenAuthority,
    pub outcome: Arc<Mutex<Option<SignInOutcome>>>,
}

impl CallbackState {
    pub fn new(authority: TokenAuthority, outcome: Arc<Mutex<Option<SignInOutcome>>>) -> Self {
        Self { authority, outcome }
    }
}

/// `GET /callback?code=..` (or `?error=..` when the user declined).
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<CallbackState>,
) -> Html<&'static str> {
    let (outcome, page) = if let Some(code) = params.get("code") {
        match state.authority.exchange_code(code).await {
            Ok(()) => (
                SignInOutcome::Succeeded,
                Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>"),
            ),
            Err(e) => {
                warning!("Token exchange failed: {}", e);
                (
                    SignInOutcome::Failed(e.to_string()),
                    Html("<h4>Login failed.</h4>"),
                )
            }
        }
    } else if let Some(error) = params.get("error") {
        (
            SignInOutcome::Failed(format!("authorization denied: {error}")),
            Html("<h4>Authorization was denied.</h4>"),
        )
    } else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    *state.outcome.lock().await = Some(outcome);
    page
}
