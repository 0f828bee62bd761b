//! Personal Access Token authentication

use crate::auth::provider::{AuthHeader, AuthProvider};
use crate::error::AuthError;
use crate::util::SecretString;
use async_trait::async_trait;

/// Environment variables checked by [`PatProvider::from_env`], in order
const TOKEN_ENV_VARS: &[&str] = &["GITHUB_PERSONAL_ACCESS_TOKEN", "GITHUB_TOKEN"];

/// Personal Access Token authentication provider
#[derive(Debug, Clone)]
pub struct PatProvider {
    token: SecretString,
}

impl PatProvider {
    pub fn new(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = SecretString::new(token);
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        // Classic (ghp_) and fine-grained (github_pat_) prefixes are not
        // enforced; GHES and Actions tokens use others.
        Ok(Self { token })
    }

    pub fn from_env() -> Result<Self, AuthError> {
        for var in TOKEN_ENV_VARS {
            if let Ok(token) = std::env::var(var)
                && !token.is_empty()
            {
                return Self::new(token);
            }
        }

        Err(AuthError::NotConfigured)
    }
}

#[async_trait]
impl AuthProvider for PatProvider {
    async fn get_auth_header(&self) -> Result<AuthHeader, AuthError> {
        Ok(AuthHeader::Bearer(self.token.clone()))
    }

    fn auth_type(&self) -> &'static str {
        "Personal Access Token"
    }
}
