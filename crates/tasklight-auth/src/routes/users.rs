// Current-user endpoints: profile and owned items.

use serde::Serialize;

use tasklight_core::models::PublicUser;

use crate::context::AuthContext;
use crate::guard::{resolve_identity, GuardError};

/// Scope required to read the current user's profile.
pub const SCOPE_ME: &str = "me";
/// Scope required to read the current user's items.
pub const SCOPE_ITEMS: &str = "items";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: String,
    pub owner: String,
}

/// `GET /users/me` — requires the `me` scope.
pub async fn handle_me(
    ctx: &AuthContext,
    authorization: Option<&str>,
) -> Result<PublicUser, GuardError> {
    let user = resolve_identity(ctx, authorization, &[SCOPE_ME]).await?;
    Ok(user.to_public())
}

/// `GET /users/me/items` — requires the `items` scope.
///
/// Ownership comes from the resolved principal, never from the request.
pub async fn handle_my_items(
    ctx: &AuthContext,
    authorization: Option<&str>,
) -> Result<Vec<Item>, GuardError> {
    let user = resolve_identity(ctx, authorization, &[SCOPE_ITEMS]).await?;
    Ok(vec![Item {
        item_id: "Foo".to_string(),
        owner: user.email,
    }])
}
