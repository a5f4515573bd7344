// Scope-gated identity resolution — the request-time gate.
//
// Four steps per protected request: extract the bearer token, verify it,
// re-resolve the current principal, and check the endpoint's required
// scopes against the token's granted set. Expired and malformed tokens
// map to the same client-visible failure; the distinction lives in logs.

use tasklight_core::models::User;
use tasklight_core::store::StoreError;

use crate::context::AuthContext;
use crate::crypto::token::TokenError;

/// Resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// No, invalid, or expired credentials; or the subject no longer
    /// resolves to a usable principal. Carries the `WWW-Authenticate`
    /// challenge value.
    #[error("could not validate credentials")]
    Unauthenticated { challenge: String },

    /// The caller is known but lacks a required scope.
    #[error("not enough permissions")]
    Forbidden { challenge: String },

    /// The credential store failed; aborts the request as an upstream
    /// error, never as an auth decision.
    #[error(transparent)]
    Upstream(#[from] StoreError),
}

/// Build the `WWW-Authenticate` value for a set of required scopes.
fn challenge_for(required_scopes: &[&str]) -> String {
    if required_scopes.is_empty() {
        "Bearer".to_string()
    } else {
        format!("Bearer scope=\"{}\"", required_scopes.join(" "))
    }
}

/// Extract the token from an `Authorization: Bearer ...` header value.
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix("Bearer ")
        .or_else(|| authorization.strip_prefix("bearer "))
}

/// Resolve the verified principal for a request, enforcing
/// `required_scopes`.
///
/// Tokens are not trusted as the sole source of user state: the subject
/// is re-fetched so accounts disabled since issuance are caught here.
pub async fn resolve_identity(
    ctx: &AuthContext,
    authorization: Option<&str>,
    required_scopes: &[&str],
) -> Result<User, GuardError> {
    let challenge = challenge_for(required_scopes);

    // 1. Extract
    let token = authorization
        .and_then(extract_bearer_token)
        .ok_or_else(|| GuardError::Unauthenticated {
            challenge: challenge.clone(),
        })?;

    // 2. Verify
    let claims = ctx.codec.verify(token).map_err(|e| {
        match e {
            TokenError::Expired => tracing::debug!("token rejected: expired"),
            TokenError::Malformed => tracing::debug!("token rejected: malformed"),
        }
        GuardError::Unauthenticated {
            challenge: challenge.clone(),
        }
    })?;

    // 3. Re-resolve the principal
    let user = ctx
        .store
        .find_by_email(&claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::debug!("token subject no longer resolves");
            GuardError::Unauthenticated {
                challenge: challenge.clone(),
            }
        })?;

    if user.disabled {
        tracing::warn!(user_id = %user.id, "request rejected: account disabled");
        return Err(GuardError::Unauthenticated { challenge });
    }

    // 4. Scope containment, exact string membership
    for scope in required_scopes {
        if !claims.has_scope(scope) {
            tracing::debug!(missing = %scope, "request rejected: insufficient scope");
            return Err(GuardError::Forbidden { challenge });
        }
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::context::tests::RejectingVerifier;
    use tasklight_core::config::AuthConfig;
    use tasklight_core::store::{NewUser, UserStore};
    use tasklight_memory::MemoryStore;

    async fn ctx_with_user() -> (Arc<AuthContext>, MemoryStore) {
        let store = MemoryStore::new();
        store
            .create(NewUser {
                email: "user@example.com".into(),
                name: "User".into(),
                password_hash: "salt:key".into(),
            })
            .await
            .unwrap();
        let ctx = AuthContext::new(
            AuthConfig::new("signing-secret", "session-secret"),
            Arc::new(store.clone()),
            Arc::new(RejectingVerifier),
        )
        .unwrap();
        (ctx, store)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn test_valid_token_resolves() {
        let (ctx, _) = ctx_with_user().await;
        let token = ctx
            .codec
            .issue("user@example.com", &["me".to_string()])
            .unwrap();
        let user = resolve_identity(&ctx, Some(&bearer(&token)), &["me"])
            .await
            .unwrap();
        assert_eq!(user.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let (ctx, _) = ctx_with_user().await;
        let err = resolve_identity(&ctx, None, &[]).await.unwrap_err();
        match err {
            GuardError::Unauthenticated { challenge } => assert_eq!(challenge, "Bearer"),
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_bearer_scheme_is_unauthenticated() {
        let (ctx, _) = ctx_with_user().await;
        let err = resolve_identity(&ctx, Some("Basic dXNlcjpwYXNz"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthenticated() {
        let (ctx, _) = ctx_with_user().await;
        let err = resolve_identity(&ctx, Some("Bearer not.a.token"), &["me"])
            .await
            .unwrap_err();
        match err {
            GuardError::Unauthenticated { challenge } => {
                assert_eq!(challenge, "Bearer scope=\"me\"")
            }
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_scope_is_forbidden() {
        let (ctx, _) = ctx_with_user().await;
        let token = ctx
            .codec
            .issue("user@example.com", &["me".to_string()])
            .unwrap();
        let err = resolve_identity(&ctx, Some(&bearer(&token)), &["items"])
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_empty_required_scopes_accepts_any_token() {
        let (ctx, _) = ctx_with_user().await;
        let token = ctx.codec.issue("user@example.com", &[]).unwrap();
        assert!(resolve_identity(&ctx, Some(&bearer(&token)), &[])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_superset_scopes_accepted() {
        let (ctx, _) = ctx_with_user().await;
        let token = ctx
            .codec
            .issue(
                "user@example.com",
                &["me".to_string(), "items".to_string()],
            )
            .unwrap();
        assert!(resolve_identity(&ctx, Some(&bearer(&token)), &["me"])
            .await
            .is_ok());
        assert!(resolve_identity(&ctx, Some(&bearer(&token)), &["items"])
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unknown_subject_is_unauthenticated() {
        let (ctx, _) = ctx_with_user().await;
        let token = ctx.codec.issue("ghost@example.com", &[]).unwrap();
        let err = resolve_identity(&ctx, Some(&bearer(&token)), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_disabled_since_issuance_is_caught() {
        let (ctx, store) = ctx_with_user().await;
        let token = ctx.codec.issue("user@example.com", &[]).unwrap();

        // Disable the account after the token was minted
        let mut user = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        user.disabled = true;
        store.insert(user).await;

        let err = resolve_identity(&ctx, Some(&bearer(&token)), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_store_outage_is_upstream_error() {
        let ctx = AuthContext::new(
            AuthConfig::new("signing-secret", "session-secret"),
            Arc::new(crate::context::tests::FailingStore),
            Arc::new(RejectingVerifier),
        )
        .unwrap();
        let token = ctx.codec.issue("user@example.com", &[]).unwrap();
        let err = resolve_identity(&ctx, Some(&bearer(&token)), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::Upstream(_)));
    }
}
