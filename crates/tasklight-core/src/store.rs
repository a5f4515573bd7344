// UserStore — the credential-store contract.
//
// The backing store is an opaque keyed record store reached by equality
// lookups; every backend (memory, SQL, hosted API) implements this trait.
// A store failure is its own failure class: it must never be folded into
// "no such user" or treated as a successful authentication.

use std::fmt;

use async_trait::async_trait;

use crate::models::User;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a `UserStore` backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend is unreachable or returned a malformed response.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint was violated (duplicate email).
    #[error("duplicate record: {0}")]
    Duplicate(String),
}

/// Fields for creating a password-credentialed principal.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Verified profile from an OAuth provider, used for upserts.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub email: String,
    pub name: String,
}

/// The credential-store adapter.
///
/// Lookups are by normalized (lower-cased) email; implementations may
/// assume callers have normalized already but must not break if they
/// have not.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a principal by email. `Ok(None)` means "no such user";
    /// backend failures are `Err`, never `Ok(None)`.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Create a new principal with a password credential.
    /// Fails with `StoreError::Duplicate` if the email is taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// Create-or-update a principal from a verified OAuth profile:
    /// create if absent, refresh the display name if present. The stored
    /// password hash (if any) is left untouched.
    async fn upsert_oauth(&self, profile: OAuthProfile) -> StoreResult<User>;
}

impl fmt::Debug for dyn UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn UserStore")
    }
}
