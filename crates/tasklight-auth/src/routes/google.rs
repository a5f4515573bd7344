// Google sign-in and delegated-token endpoints.
//
// The callback substitutes the password check with the provider's
// issuer/audience verification, then funnels into the same token codec.
// The provider's access token is stored in the caller's session for
// later calendar calls; it is not part of the first-party token.

use serde::{Deserialize, Serialize};

use tasklight_core::models::PublicUser;
use tasklight_core::store::{OAuthProfile, StoreError};

use crate::context::AuthContext;
use crate::oauth::OAuthError;
use crate::routes::users::SCOPE_ME;
use crate::session::SessionData;

/// The provider key under which the delegated token is stored.
pub const GOOGLE_PROVIDER: &str = "google";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub code: String,
    pub redirect_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct DelegatedTokenResponse {
    pub access_token: String,
}

/// Google sign-in failures.
#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    /// Exchange rejected or ID token invalid. Reported as a generic
    /// failed login.
    #[error("could not validate credentials")]
    VerificationFailed,

    /// The provider attests the email but has not verified it; never a
    /// valid login.
    #[error("email not verified")]
    EmailNotVerified,

    /// Google is unreachable.
    #[error("provider unavailable")]
    ProviderUnavailable,

    /// The credential store is down.
    #[error(transparent)]
    Upstream(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<OAuthError> for GoogleAuthError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::ExchangeFailed(detail) => {
                tracing::warn!(%detail, "google exchange failed");
                Self::VerificationFailed
            }
            OAuthError::TokenInvalid(detail) => {
                tracing::warn!(%detail, "google ID token invalid");
                Self::VerificationFailed
            }
            OAuthError::Unavailable(detail) => {
                tracing::error!(%detail, "google unreachable");
                Self::ProviderUnavailable
            }
        }
    }
}

/// Handle the OAuth callback: verify the code, upsert the principal,
/// mint a first-party token, and stash the delegated token in the
/// session.
pub async fn handle_google_auth(
    ctx: &AuthContext,
    session: &mut SessionData,
    body: GoogleAuthRequest,
) -> Result<GoogleAuthResponse, GoogleAuthError> {
    let identity = ctx
        .verifier
        .verify_code(&body.code, &body.redirect_uri)
        .await?;

    // An unverified email never becomes a login, even when the issuer
    // and signature checks pass.
    if !identity.email_verified {
        tracing::warn!("google sign-in refused: email not verified");
        return Err(GoogleAuthError::EmailNotVerified);
    }

    let user = ctx
        .store
        .upsert_oauth(OAuthProfile {
            email: identity.email.clone(),
            name: identity.name.unwrap_or_else(|| identity.email.clone()),
        })
        .await?;

    if user.disabled {
        tracing::warn!(user_id = %user.id, "google sign-in refused: account disabled");
        return Err(GoogleAuthError::VerificationFailed);
    }

    let access_token = ctx
        .codec
        .issue(&user.email, &[SCOPE_ME.to_string()])
        .map_err(|e| GoogleAuthError::Internal(e.to_string()))?;

    session.store(GOOGLE_PROVIDER, identity.access_token);

    tracing::info!(user_id = %user.id, "google sign-in succeeded");

    Ok(GoogleAuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.to_public(),
    })
}

/// Return the stored delegated token, if the session holds one.
pub fn handle_google_token(session: &SessionData) -> Option<DelegatedTokenResponse> {
    session.get(GOOGLE_PROVIDER).map(|t| DelegatedTokenResponse {
        access_token: t.to_string(),
    })
}

/// Drop the delegated token from the session; no-op when absent.
pub fn handle_google_logout(session: &mut SessionData) {
    session.remove(GOOGLE_PROVIDER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::context::tests::{RejectingVerifier, StubVerifier};
    use crate::oauth::OAuthIdentity;
    use tasklight_core::config::AuthConfig;
    use tasklight_core::store::UserStore;
    use tasklight_memory::MemoryStore;

    fn identity(verified: bool) -> OAuthIdentity {
        OAuthIdentity {
            email: "OAuth.User@Example.com".into(),
            email_verified: verified,
            name: Some("OAuth User".into()),
            picture: None,
            access_token: "ya29.provider-token".into(),
        }
    }

    fn request() -> GoogleAuthRequest {
        GoogleAuthRequest {
            code: "auth-code".into(),
            redirect_uri: "http://localhost:3000/callback".into(),
        }
    }

    fn ctx(store: MemoryStore, verifier: impl crate::oauth::IdentityVerifier + 'static) -> Arc<AuthContext> {
        AuthContext::new(
            AuthConfig::new("signing-secret", "session-secret"),
            Arc::new(store),
            Arc::new(verifier),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_callback_mints_token_and_stores_delegated() {
        let store = MemoryStore::new();
        let ctx = ctx(store.clone(), StubVerifier(identity(true)));
        let mut session = SessionData::new();

        let resp = handle_google_auth(&ctx, &mut session, request())
            .await
            .unwrap();
        assert_eq!(resp.token_type, "bearer");
        assert_eq!(resp.user.email, "oauth.user@example.com");

        // First-party token is verifiable and carries the "me" scope
        let claims = ctx.codec.verify(&resp.access_token).unwrap();
        assert_eq!(claims.sub, "oauth.user@example.com");
        assert!(claims.has_scope("me"));

        // Delegated token went into the session, not the bearer token
        assert_eq!(session.get(GOOGLE_PROVIDER), Some("ya29.provider-token"));

        // The principal was upserted without a password credential
        let stored = store
            .find_by_email("oauth.user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert!(stored.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_unverified_email_never_signs_in() {
        let store = MemoryStore::new();
        let ctx = ctx(store.clone(), StubVerifier(identity(false)));
        let mut session = SessionData::new();

        let err = handle_google_auth(&ctx, &mut session, request())
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleAuthError::EmailNotVerified));

        // No principal created, no delegated token stored
        assert!(store
            .find_by_email("oauth.user@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_generic_failure() {
        let ctx = ctx(MemoryStore::new(), RejectingVerifier);
        let mut session = SessionData::new();
        let err = handle_google_auth(&ctx, &mut session, request())
            .await
            .unwrap_err();
        assert!(matches!(err, GoogleAuthError::VerificationFailed));
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn test_delegated_token_retrieval_and_logout() {
        let mut session = SessionData::new();
        assert!(handle_google_token(&session).is_none());

        session.store(GOOGLE_PROVIDER, "tok123");
        assert_eq!(
            handle_google_token(&session).unwrap().access_token,
            "tok123"
        );

        handle_google_logout(&mut session);
        assert!(handle_google_token(&session).is_none());
        // Logging out twice is fine
        handle_google_logout(&mut session);
    }
}
