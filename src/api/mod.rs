//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that `spotauth login`
//! starts while the user signs in.
//!
//! ## Endpoints
//!
//! - [`callback`] - Spotify redirects the browser here with `?code=..`. The
//!   handler passes the code to
//!   [`crate::management::TokenAuthority::exchange_code`] and records the
//!   outcome in [`CallbackState`] for the waiting command. `?error=..` (the
//!   user declined) is recorded as a failure.
//! - [`health`] - Liveness probe returning status, name and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use spotauth::api::{callback, health, CallbackState};
//!
//! let app = Router::new()
//!     .route("/health", get(health))
//!     .route("/callback", get(callback).layer(Extension(state)));
//! ```

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;
