//! # Spotify Accounts Integration
//!
//! Talks to the Spotify accounts service: the `/authorize` page the user
//! signs in on, and the `/api/token` endpoint that issues access tokens.
//!
//! ## Wire contract
//!
//! Every token request is
//!
//! ```text
//! POST https://accounts.spotify.com/api/token
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic base64(client_id:client_secret)
//! ```
//!
//! with one of two bodies:
//!
//! - `code=<code>&redirect_uri=<redirect_uri>&grant_type=authorization_code`
//! - `grant_type=refresh_token&refresh_token=<refresh_token>`
//!
//! and answers `{access_token, expires_in, refresh_token?, scope, token_type}`.
//! A missing `refresh_token` in a refresh answer means "keep the old one".
//!
//! ## Seams
//!
//! [`auth::TokenEndpoint`] is the only thing the
//! [`crate::management::TokenAuthority`] knows about HTTP. The production
//! implementation is [`auth::HttpTokenEndpoint`] (reqwest, 30 second timeout,
//! no retries); tests substitute their own.
//!
//! ## Sign-in
//!
//! [`auth::sign_in`] drives the browser round trip: local callback server,
//! browser launch, then a bounded wait for the callback to finish the code
//! exchange.

pub mod auth;
