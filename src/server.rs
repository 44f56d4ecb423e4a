use std::{net::SocketAddr, str::FromStr};

use axum::{Extension, Router, routing::get};

use crate::api::{self, CallbackState};

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Serves the sign-in callback on `address` until the task is aborted.
pub async fn start_api_server(address: &str, state: CallbackState) -> crate::Res<()> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| format!("Failed to parse server address {address}: {e}"))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::debug!(%addr, "callback server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
