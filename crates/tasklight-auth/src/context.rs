// AuthContext — the fully-initialized auth state shared across request
// handlers.
//
// Built once at startup from `AuthConfig` plus injected store/verifier
// dependencies; handlers receive it as `Arc<AuthContext>`. There is no
// per-request global lookup.

use std::sync::Arc;

use tasklight_core::config::AuthConfig;
use tasklight_core::error::Result;
use tasklight_core::store::UserStore;

use crate::crypto::token::TokenCodec;
use crate::oauth::IdentityVerifier;

pub struct AuthContext {
    /// The original configuration.
    pub config: AuthConfig,

    /// Access-token codec (secret, algorithm, and TTL pinned).
    pub codec: TokenCodec,

    /// The credential store.
    pub store: Arc<dyn UserStore>,

    /// The OAuth identity verifier.
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("codec", &self.codec)
            .field("session_max_age", &self.config.session_max_age)
            .finish()
    }
}

impl AuthContext {
    /// Build the context. Fails if the configured signing algorithm is
    /// unusable.
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn UserStore>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let codec = TokenCodec::new(
            &config.secret,
            &config.algorithm,
            config.access_token_ttl_minutes,
        )?;

        Ok(Arc::new(Self {
            config,
            codec,
            store,
            verifier,
        }))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::oauth::{OAuthError, OAuthIdentity};
    use tasklight_core::models::User;
    use tasklight_core::store::{NewUser, OAuthProfile, StoreError, StoreResult};

    /// A store whose every call fails, for upstream-outage tests.
    pub struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn create(&self, _user: NewUser) -> StoreResult<User> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn upsert_oauth(&self, _profile: OAuthProfile) -> StoreResult<User> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// A verifier returning a fixed identity, for flow tests.
    pub struct StubVerifier(pub OAuthIdentity);

    #[async_trait]
    impl crate::oauth::IdentityVerifier for StubVerifier {
        async fn verify_code(
            &self,
            _code: &str,
            _redirect_uri: &str,
        ) -> std::result::Result<OAuthIdentity, OAuthError> {
            Ok(self.0.clone())
        }
    }

    /// A verifier that always rejects the exchange.
    pub struct RejectingVerifier;

    #[async_trait]
    impl crate::oauth::IdentityVerifier for RejectingVerifier {
        async fn verify_code(
            &self,
            _code: &str,
            _redirect_uri: &str,
        ) -> std::result::Result<OAuthIdentity, OAuthError> {
            Err(OAuthError::ExchangeFailed("invalid_grant".into()))
        }
    }

    #[test]
    fn test_context_creation() {
        let config = AuthConfig::new("signing-secret", "session-secret");
        let ctx = AuthContext::new(
            config,
            Arc::new(FailingStore),
            Arc::new(RejectingVerifier),
        );
        assert!(ctx.is_ok());
    }

    #[test]
    fn test_context_rejects_bad_algorithm() {
        let config = AuthConfig::new("s", "ss").algorithm("ES999");
        let ctx = AuthContext::new(
            config,
            Arc::new(FailingStore),
            Arc::new(RejectingVerifier),
        );
        assert!(ctx.is_err());
    }
}
