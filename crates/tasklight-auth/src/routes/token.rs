// Login — password credentials in, bearer token out.

use serde::{Deserialize, Serialize};

use tasklight_core::store::StoreError;

use crate::authenticator;
use crate::context::AuthContext;

/// Form-encoded login request. `scope` is the OAuth2 password-flow
/// space-delimited scope string.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl LoginForm {
    /// Requested scopes, deduplicated, insertion order preserved.
    pub fn scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = Vec::new();
        if let Some(raw) = &self.scope {
            for s in raw.split_whitespace() {
                if !scopes.iter().any(|existing| existing == s) {
                    scopes.push(s.to_string());
                }
            }
        }
        scopes
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Login failures.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Unknown email, wrong password, OAuth-only account, or disabled
    /// account — one generic failure for all of them.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// The credential store is down.
    #[error(transparent)]
    Upstream(#[from] StoreError),

    /// Token minting failed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Handle a password login and mint an access token carrying the
/// requested scopes.
pub async fn handle_login(
    ctx: &AuthContext,
    form: LoginForm,
) -> Result<TokenResponse, LoginError> {
    let user = authenticator::authenticate(ctx.store.as_ref(), &form.username, &form.password)
        .await?
        .ok_or(LoginError::InvalidCredentials)?;

    let scopes = form.scopes();
    let access_token = ctx
        .codec
        .issue(&user.email, &scopes)
        .map_err(|e| LoginError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}
