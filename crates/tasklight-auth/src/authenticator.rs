// Credential authentication.
//
// Combines the store lookup with password verification. A miss, an
// OAuth-only account, a wrong password, and a disabled account all
// collapse to `Ok(None)` — callers present one generic failure. Store
// errors stay errors: an outage is never "wrong password".

use tasklight_core::models::User;
use tasklight_core::store::{StoreError, UserStore};

use crate::crypto::password;

/// Validate a login attempt and produce the verified principal.
///
/// The identifier is lower-cased before lookup. When the account is
/// missing or has no password credential, a dummy hash is computed so
/// the miss path costs roughly the same as a verify; the store lookup
/// itself is not constant-time, so this is best effort.
pub async fn authenticate(
    store: &dyn UserStore,
    identifier: &str,
    plaintext: &str,
) -> Result<Option<User>, StoreError> {
    let email = identifier.to_lowercase();
    let user = match store.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            burn_hash(plaintext);
            tracing::debug!("login failed: unknown email");
            return Ok(None);
        }
    };

    let Some(stored_hash) = user.password_hash.as_deref() else {
        // OAuth-only account: no password ever matches.
        burn_hash(plaintext);
        tracing::debug!("login failed: account has no password credential");
        return Ok(None);
    };

    if !password::verify_password(stored_hash, plaintext) {
        tracing::debug!("login failed: password mismatch");
        return Ok(None);
    }

    if user.disabled {
        tracing::warn!(user_id = %user.id, "login rejected: account disabled");
        return Ok(None);
    }

    Ok(Some(user))
}

/// Level the timing of miss paths against the verify path.
fn burn_hash(plaintext: &str) {
    let _ = password::hash_password(plaintext);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklight_core::store::NewUser;
    use tasklight_memory::MemoryStore;

    async fn store_with_user(email: &str, password: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create(NewUser {
                email: email.into(),
                name: "Test User".into(),
                password_hash: password::hash_password(password).unwrap(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_correct_credentials() {
        let store = store_with_user("user@example.com", "hunter2").await;
        let user = authenticate(&store, "user@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.unwrap().email, "user@example.com");
    }

    #[tokio::test]
    async fn test_identifier_case_insensitive() {
        let store = store_with_user("user@example.com", "hunter2").await;
        let user = authenticate(&store, "USER@example.com", "hunter2")
            .await
            .unwrap();
        assert!(user.is_some());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let store = store_with_user("user@example.com", "hunter2").await;
        let user = authenticate(&store, "user@example.com", "wrongpass")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let store = MemoryStore::new();
        let user = authenticate(&store, "nobody@example.com", "hunter2")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_oauth_only_account_never_matches() {
        let store = MemoryStore::new();
        store
            .upsert_oauth(tasklight_core::store::OAuthProfile {
                email: "oauth@example.com".into(),
                name: "OAuth User".into(),
            })
            .await
            .unwrap();

        // No password matches an account with a null hash — not even ""
        for attempt in ["", "password", "None"] {
            let user = authenticate(&store, "oauth@example.com", attempt)
                .await
                .unwrap();
            assert!(user.is_none());
        }
    }

    #[tokio::test]
    async fn test_disabled_account_rejected() {
        let store = store_with_user("user@example.com", "hunter2").await;
        let mut user = store
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        user.disabled = true;
        store.insert(user).await;

        let result = authenticate(&store, "user@example.com", "hunter2")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = crate::context::tests::FailingStore;
        let result = authenticate(&store, "user@example.com", "hunter2").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
