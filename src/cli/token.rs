use chrono::Utc;

use crate::{
    error, info, management::TokenAuthority, success, types::AuthState, warning,
};

/// Prints a bearer token that is good for at least five more minutes.
///
/// Only the token goes to stdout, so the output can be captured directly:
///
/// ```bash
/// curl -H "Authorization: Bearer $(spotauth token)" https://api.spotify.com/v1/me
/// ```
pub async fn token(authority: &TokenAuthority) {
    match authority.get_valid_token().await {
        Ok(token) => println!("{}", token),
        Err(e) => error!("Cannot get a valid token: {}", e),
    }
}

/// Refreshes the access token if it is close to expiry.
pub async fn refresh(authority: &TokenAuthority) {
    let before = authority.state().await;

    match authority.refresh().await {
        Ok(()) if before == AuthState::Valid => info!("Token is still valid, nothing to refresh."),
        Ok(()) => success!("Token refreshed."),
        Err(e) => error!("Token refresh failed: {}", e),
    }
}

/// Shows whether a session exists and when its token expires.
pub async fn status(authority: &TokenAuthority) {
    let state = authority.state().await;
    let Some(credential) = authority.credential().await else {
        warning!("Not signed in. Run spotauth login.");
        return;
    };

    let remaining = credential.expires_at - Utc::now();
    info!("State: {}", state);
    info!(
        "Expires at {} ({} minutes from now)",
        credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        remaining.num_minutes()
    );

    if credential.refresh_token.is_none() {
        warning!("No refresh token stored; the session cannot be renewed.");
    }
}
