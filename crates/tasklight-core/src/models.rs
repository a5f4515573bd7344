// Data models for the auth subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A principal — an authenticated actor.
///
/// The email is the lookup key and is always lower-cased before storage.
/// `password_hash` is `None` for OAuth-only accounts; such accounts must
/// fail password authentication rather than match any password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: String, name: String) -> Self {
        Self {
            id,
            email: email.to_lowercase(),
            name,
            password_hash: None,
            disabled: false,
            created_at: Utc::now(),
        }
    }

    /// The wire-safe view of this principal.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// The view of a principal returned over HTTP. Never carries the
/// password hash or the disabled flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
