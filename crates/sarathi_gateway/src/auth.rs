//! Caller identity. Token verification is a black box behind
//! [`IdentityVerifier`]; the shipped implementation maps configured static
//! tokens to stable external uids.

use async_trait::async_trait;
use axum::http::HeaderMap;
use sarathi_core::config::AuthConfig;
use sarathi_core::{Error, Result, User};
use sarathi_store::SqliteStore;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub external_uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity>;
}

/// Static bearer-token table from configuration.
pub struct StaticTokenVerifier {
    tokens: HashMap<String, VerifiedIdentity>,
}

impl StaticTokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| {
                (
                    t.token.clone(),
                    VerifiedIdentity {
                        external_uid: t.external_uid.clone(),
                        email: t.email.clone(),
                        display_name: t.display_name.clone(),
                    },
                )
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("unknown token".to_string()))
    }
}

/// Resolve the caller from the Authorization header: verify the bearer
/// token, then find-or-create the user (touching `last_active`).
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    store: &SqliteStore,
    headers: &HeaderMap,
) -> Result<User> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("expected Bearer token".to_string()))?;

    let identity = verifier.verify(token).await?;
    store
        .upsert_user(
            &identity.external_uid,
            identity.email.as_deref(),
            identity.display_name.as_deref(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarathi_core::config::AuthToken;

    fn verifier() -> StaticTokenVerifier {
        StaticTokenVerifier::from_config(&AuthConfig {
            tokens: vec![AuthToken {
                token: "dev-token".into(),
                external_uid: "dev-user".into(),
                display_name: Some("Dev".into()),
                email: None,
            }],
        })
    }

    #[tokio::test]
    async fn test_known_token_verifies() {
        let identity = verifier().verify("dev-token").await.unwrap();
        assert_eq!(identity.external_uid, "dev-user");
        assert_eq!(identity.display_name.as_deref(), Some("Dev"));
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let err = verifier().verify("nope").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }
}
