// Access-token codec.
//
// Signs and verifies the `{sub, scopes, exp}` claims payload with a
// process-wide secret and a fixed algorithm. The algorithm accepted at
// verification is the configured one, never the token's own header —
// a token claiming "none" or a different algorithm fails outright.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use tasklight_core::error::{AuthError, Result};

/// The verified payload of an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The principal's email — the same key the store looks up by.
    pub sub: String,
    /// Granted scopes. Empty means "no elevated scopes", not "all".
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Expiry as UTC seconds.
    pub exp: i64,
}

impl Claims {
    /// Exact string membership; no hierarchy, no wildcards.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Token verification failures.
///
/// Callers map both variants to the same client-visible error; the
/// distinction exists for server-side logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Signs and verifies access tokens.
///
/// Built once from configuration; the secret, algorithm, and TTL are
/// immutable afterwards.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec from a secret, an algorithm name, and a TTL.
    ///
    /// Only HMAC algorithms are accepted — the secret is symmetric.
    pub fn new(secret: &str, algorithm: &str, ttl_minutes: u64) -> Result<Self> {
        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| AuthError::Config(format!("unknown signing algorithm: {algorithm}")))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::Config(format!(
                "signing algorithm must be an HMAC variant, got {algorithm:?}"
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl_secs: (ttl_minutes * 60) as i64,
        })
    }

    /// Issue a signed token for `subject` carrying `scopes`.
    ///
    /// Expiry is now + the configured TTL.
    pub fn issue(&self, subject: &str, scopes: &[String]) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            scopes: scopes.to_vec(),
            exp: chrono::Utc::now().timestamp() + self.ttl_secs,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("token signing failed: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Claims are only returned after the signature and expiry checks
    /// pass; an unverified payload is never partially trusted.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }
        Ok(data.claims)
    }
}
