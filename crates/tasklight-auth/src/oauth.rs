// OAuth identity verification.
//
// Exchanges an authorization code for provider tokens and validates the
// ID token's issuer and audience. The provider's inner protocol stays
// behind the `IdentityVerifier` trait so sign-in flows and tests can
// substitute their own.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;

/// Verified identity returned by a provider after a successful exchange.
#[derive(Debug, Clone)]
pub struct OAuthIdentity {
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    /// The provider's delegated access token, stored in the session for
    /// later outbound calls.
    pub access_token: String,
}

/// Failure modes a consuming sign-in flow must handle.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The provider rejected the token exchange (bad/used code, bad
    /// client credentials, mismatched redirect URI).
    #[error("token exchange rejected: {0}")]
    ExchangeFailed(String),

    /// The ID token's structure, issuer, or audience is invalid.
    #[error("invalid ID token: {0}")]
    TokenInvalid(String),

    /// The provider could not be reached (timeout, connection failure).
    #[error("provider unreachable: {0}")]
    Unavailable(String),
}

/// Exchanges an authorization code for a verified third-party identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthIdentity, OAuthError>;
}

// ─── Google ─────────────────────────────────────────────────────

const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Outbound call timeout. A stalled provider fails the request, not the
/// process.
const EXCHANGE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    iss: String,
    aud: String,
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Google implementation of `IdentityVerifier`.
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl GoogleVerifier {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(EXCHANGE_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static config");
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthIdentity, OAuthError> {
        let form = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_ENDPOINT)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    OAuthError::Unavailable(e.to_string())
                } else {
                    OAuthError::ExchangeFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "google token exchange rejected");
            return Err(OAuthError::ExchangeFailed(format!("{status}: {body}")));
        }

        let tokens: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::ExchangeFailed(format!("bad token response: {e}")))?;

        // The ID token arrived directly from the provider over TLS in the
        // code-exchange response, so its claims are trusted after the
        // issuer and audience checks.
        let claims = decode_id_token_claims(&tokens.id_token)?;

        if !GOOGLE_ISSUERS.contains(&claims.iss.as_str()) {
            return Err(OAuthError::TokenInvalid(format!(
                "unexpected issuer: {}",
                claims.iss
            )));
        }
        if claims.aud != self.client_id {
            return Err(OAuthError::TokenInvalid("audience mismatch".into()));
        }

        tracing::debug!(email = %claims.email, "google identity verified");

        Ok(OAuthIdentity {
            email: claims.email,
            email_verified: claims.email_verified,
            name: claims.name,
            picture: claims.picture,
            access_token: tokens.access_token,
        })
    }
}

/// Decode the claims segment of a JWT-shaped ID token.
fn decode_id_token_claims(id_token: &str) -> Result<IdTokenClaims, OAuthError> {
    let mut parts = id_token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(OAuthError::TokenInvalid("not a three-part token".into()));
    };

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| OAuthError::TokenInvalid(format!("payload not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| OAuthError::TokenInvalid(format!("payload not valid claims: {e}")))
}
