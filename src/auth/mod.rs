//! Authentication for the flight provider
//!
//! Exchanges the configured client credentials for a short-lived bearer
//! token and memoizes it until shortly before expiry.

pub mod oauth;
pub mod tokens;

pub use oauth::{ClientCredentialsExchange, TokenExchange, TokenManager};
