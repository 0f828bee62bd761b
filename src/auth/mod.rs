//! Authentication module
//!
//! Provides authentication for GitHub API access. Personal access tokens
//! (classic or fine-grained) are sent as bearer tokens; the trait leaves room
//! for GitHub App installation tokens.

pub mod provider;
pub mod token;

pub use provider::{AuthHeader, AuthProvider, BoxedAuthProvider};
pub use token::PatProvider;

use crate::config::GitHubConfig;
use crate::error::AuthError;

/// Create an auth provider from configuration
pub fn create_auth_provider(config: &GitHubConfig) -> Result<BoxedAuthProvider, AuthError> {
    match &config.token {
        Some(token) => Ok(Box::new(PatProvider::new(token.expose_secret())?)),
        None => Ok(Box::new(PatProvider::from_env()?)),
    }
}
