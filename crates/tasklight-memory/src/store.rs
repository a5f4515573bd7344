// In-memory UserStore — HashMap keyed by lower-cased email.
//
// Thread-safe via `tokio::sync::RwLock`. Email uniqueness is the map key
// itself.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use tasklight_core::models::User;
use tasklight_core::store::{NewUser, OAuthProfile, StoreError, StoreResult, UserStore};
use tokio::sync::RwLock;

/// In-memory user store.
///
/// All records live in a `HashMap` behind an `Arc<RwLock<...>>` so the
/// store can be cloned into concurrent request handlers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored principals.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.users.write().await.clear();
    }

    /// Insert a fully-formed user record directly (test setup helper).
    pub async fn insert(&self, user: User) {
        self.users
            .write()
            .await
            .insert(user.email.to_lowercase(), user);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&email.to_lowercase()).cloned())
    }

    async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let email = new_user.email.to_lowercase();
        let mut users = self.users.write().await;
        if users.contains_key(&email) {
            return Err(StoreError::Duplicate(email));
        }

        let mut user = User::new(
            uuid::Uuid::new_v4().to_string(),
            email.clone(),
            new_user.name,
        );
        user.password_hash = Some(new_user.password_hash);
        users.insert(email, user.clone());
        Ok(user)
    }

    async fn upsert_oauth(&self, profile: OAuthProfile) -> StoreResult<User> {
        let email = profile.email.to_lowercase();
        let mut users = self.users.write().await;

        if let Some(existing) = users.get_mut(&email) {
            existing.name = profile.name;
            return Ok(existing.clone());
        }

        let user = User::new(uuid::Uuid::new_v4().to_string(), email.clone(), profile.name);
        users.insert(email, user.clone());
        Ok(user)
    }
}
