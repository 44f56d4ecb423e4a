mod auth;
mod store;

pub use auth::TokenAuthority;
pub use store::CredentialStore;
pub use store::FileCredentialStore;
pub use store::MemoryCredentialStore;
