// Signup — email/password registration.

use serde::{Deserialize, Serialize};

use tasklight_core::models::PublicUser;
use tasklight_core::store::{NewUser, StoreError};

use crate::context::AuthContext;
use crate::crypto::password;
use crate::routes::is_valid_email;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user: PublicUser,
}

/// Signup failures.
#[derive(Debug, thiserror::Error)]
pub enum SignUpError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid password")]
    InvalidPassword,

    /// Duplicate email — an error status, never a success body.
    #[error("user already exists")]
    AlreadyExists,

    #[error(transparent)]
    Upstream(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Handle registration: validate, lower-case the email, hash the
/// password, create the principal.
pub async fn handle_sign_up(
    ctx: &AuthContext,
    body: SignUpRequest,
) -> Result<SignUpResponse, SignUpError> {
    if !is_valid_email(&body.email) {
        return Err(SignUpError::InvalidEmail);
    }
    if body.password.is_empty() {
        return Err(SignUpError::InvalidPassword);
    }

    let email = body.email.to_lowercase();

    // Hash before creating, so a hashing failure can't leave a record
    // without a credential.
    let password_hash = password::hash_password(&body.password)
        .map_err(|e| SignUpError::Internal(e.to_string()))?;

    let user = ctx
        .store
        .create(NewUser {
            email,
            name: body.name,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => SignUpError::AlreadyExists,
            other => SignUpError::Upstream(other),
        })?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(SignUpResponse {
        user: user.to_public(),
    })
}
