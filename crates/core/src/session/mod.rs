//! Bearer credentials for the administrative endpoints.
//!
//! Tokens are issued elsewhere; this module only keeps them and hands them to
//! the HTTP client.

mod store;
mod types;

pub use store::*;
pub use types::*;

use async_trait::async_trait;

use crate::config::ApiConfig;

/// Supplies the bearer token attached to admin requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current token, if any.
    async fn bearer(&self) -> Option<String>;

    /// Name of this credential source.
    fn method_name(&self) -> &'static str;
}

/// No credentials: only the public endpoints are usable.
pub struct Anonymous;

#[async_trait]
impl CredentialProvider for Anonymous {
    async fn bearer(&self) -> Option<String> {
        None
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

/// A fixed token read from configuration.
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer(&self) -> Option<String> {
        Some(self.token.clone())
    }

    fn method_name(&self) -> &'static str {
        "static_token"
    }
}

/// Build the credential source described by the API config.
pub fn create_credentials(config: &ApiConfig) -> Box<dyn CredentialProvider> {
    match config.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Box::new(StaticToken::new(token.to_string())),
        _ => Box::new(Anonymous),
    }
}
