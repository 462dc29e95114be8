use std::collections::HashMap;
use std::sync::Arc;
use stockroom_core::prelude::*;

/// Authenticates every request as [`AllowAllAuth::PRINCIPAL`].
#[derive(Clone)]
pub struct AllowAllAuth;

impl AllowAllAuth {
    pub const PRINCIPAL: &'static str = "dev_user";
}

impl AuthProvider for AllowAllAuth {
    async fn verify(&self, _token: &str) -> Result<Principal, AuthError> {
        Ok(Principal::new(Self::PRINCIPAL))
    }
}

/// Fixed token to principal table.
#[derive(Clone, Default)]
pub struct StaticTokenAuth {
    tokens: Arc<HashMap<String, String>>,
}

impl StaticTokenAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.tokens).insert(token.into(), principal.into());
        self
    }
}

impl AuthProvider for StaticTokenAuth {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        self.tokens
            .get(token)
            .map(Principal::new)
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_tokens_map_to_principals() {
        let auth = StaticTokenAuth::new()
            .with_token("token-u1", "u1")
            .with_token("token-u2", "u2");
        assert_eq!(auth.verify("token-u1").await.unwrap().id, "u1");
        assert_eq!(auth.verify("token-u2").await.unwrap().id, "u2");
        assert!(matches!(
            auth.verify("").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn allow_all_uses_dev_principal() {
        assert_eq!(AllowAllAuth.verify("anything").await.unwrap().id, "dev_user");
    }
}
