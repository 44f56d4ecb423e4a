//! # CLI Module
//!
//! Command implementations behind the `spotauth` binary. Each command receives
//! the process-wide [`crate::management::TokenAuthority`] built in `main`
//! and reports to the user through the crate's `info!`/`success!`/
//! `warning!`/`error!` macros.
//!
//! ## Commands
//!
//! - [`login`] - Browser sign-in; exchanges the returned code for a credential
//! - [`url`] - Prints the sign-in URL without starting the callback server
//! - [`token`] - Prints a valid access token, refreshing first if stale
//! - [`refresh`] - Refreshes the token when it is inside the expiry window
//! - [`status`] - Shows the session state and token expiry
//! - [`logout`] - Clears the stored credential locally
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotauth login                  # sign in once
//! spotauth token                  # bearer token for scripts
//! spotauth status                 # inspect expiry
//! spotauth logout
//! ```

mod auth;
mod token;

pub use auth::login;
pub use auth::logout;
pub use auth::url;
pub use token::refresh;
pub use token::status;
pub use token::token;
