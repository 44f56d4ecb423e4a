//! Spotify OAuth Token Authority
//!
//! Signs a user in to Spotify with the authorization-code grant, keeps the
//! resulting credential on disk, and hands out bearer tokens that are never
//! within five minutes of expiry. Concurrent callers that find the token stale
//! share a single refresh round trip.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local sign-in callback server
//! - `cli` - Command implementations behind the `spotauth` binary
//! - `config` - Environment-driven configuration and fixed constants
//! - `error` - Error types for the authority, its store and configuration
//! - `management` - The [`management::TokenAuthority`] and credential stores
//! - `server` - Local HTTP server for the sign-in callback
//! - `spotify` - Token endpoint transport and sign-in URL/flow
//! - `types` - Credential, token response and state types
//! - `utils` - Staleness check, clocks and encoding helpers
//!
//! # Example
//!
//! ```
//! use spotauth::{config::AuthConfig, management::TokenAuthority};
//!
//! #[tokio::main]
//! async fn main() -> spotauth::Res<()> {
//!     let config = AuthConfig::from_env()?;
//!     let authority = TokenAuthority::from_config(&config).await?;
//!     let _header = authority.bearer_header().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed-error result for the binary and the interactive sign-in flow.
///
/// Library operations on the token authority return [`error::AuthError`]
/// instead, so callers can match on the failure.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// CLI progress line, prefixed with a blue `o`.
///
/// ```ignore
/// info!("Opening the Spotify sign-in page...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// CLI line for a completed step (signed in, token refreshed), prefixed
/// with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a fatal CLI error with a red `!` and exits with status 1.
///
/// Only the binary uses this. Library code returns [`error::AuthError`] and
/// never terminates the process.
///
/// ```ignore
/// error!("Sign-in failed: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Non-fatal CLI notice, prefixed with a yellow `!`. Used when the browser
/// cannot be opened, a callback exchange fails, or no session is held.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
