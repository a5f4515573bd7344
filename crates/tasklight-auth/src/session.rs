// Delegated-token session store.
//
// Associates a signed-in browser session with third-party access tokens
// obtained via OAuth, keyed by provider name. The session travels as an
// HMAC-SHA256 signed cookie value: "base64url(json).base64url(sig)".
// Tampering is detectable; the token values inside the signed payload
// are cleartext, so the session-signing secret guards them all.

use std::collections::HashMap;

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const B64: base64::engine::general_purpose::GeneralPurpose =
    base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Server-side session contents.
///
/// At most one token per provider; a later `store` overwrites. No expiry
/// tracking of its own — the cookie's max-age bounds the session, and an
/// expired provider token surfaces as that provider's own auth failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    tokens: HashMap<String, String>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the delegated token for `provider`, overwriting any
    /// previous value.
    pub fn store(&mut self, provider: &str, token: impl Into<String>) {
        self.tokens.insert(provider.to_string(), token.into());
    }

    /// Get the delegated token for `provider`.
    pub fn get(&self, provider: &str) -> Option<&str> {
        self.tokens.get(provider).map(String::as_str)
    }

    /// Remove the token for `provider`; no-op when absent.
    pub fn remove(&mut self, provider: &str) {
        self.tokens.remove(provider);
    }

    /// Drop every stored token.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize and sign this session into a cookie value.
    pub fn seal(&self, secret: &str) -> String {
        let payload = B64.encode(serde_json::to_vec(self).unwrap_or_default());
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
        mac.update(payload.as_bytes());
        let sig = B64.encode(mac.finalize().into_bytes());
        format!("{payload}.{sig}")
    }

    /// Verify and parse a sealed cookie value.
    ///
    /// A missing value, bad signature, or malformed payload all yield a
    /// fresh empty session. A tampered cookie is indistinguishable from
    /// no cookie.
    pub fn open(sealed: Option<&str>, secret: &str) -> Self {
        let Some(sealed) = sealed else {
            return Self::default();
        };
        let Some((payload, sig_b64)) = sealed.rsplit_once('.') else {
            return Self::default();
        };
        let Ok(sig) = B64.decode(sig_b64) else {
            return Self::default();
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return Self::default();
        };
        mac.update(payload.as_bytes());
        if mac.verify_slice(&sig).is_err() {
            return Self::default();
        }
        let Ok(bytes) = B64.decode(payload) else {
            return Self::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }
}
