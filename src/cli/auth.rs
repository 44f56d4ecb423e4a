use crate::{
    config::AuthConfig, error, info, management::TokenAuthority, spotify, success,
};

/// Signs in through the browser and stores the resulting credential.
pub async fn login(authority: TokenAuthority, config: &AuthConfig) {
    info!("Opening the Spotify sign-in page...");

    match spotify::auth::sign_in(authority, config).await {
        Ok(()) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

/// Prints the sign-in URL, for signing in on another device.
pub fn url(config: &AuthConfig) {
    println!("{}", spotify::auth::sign_in_url(config));
}

/// Forgets the stored credential.
pub async fn logout(authority: &TokenAuthority) {
    if !authority.is_signed_in().await {
        info!("Not signed in.");
        return;
    }

    authority.sign_out().await;
    success!("Signed out.");
}
