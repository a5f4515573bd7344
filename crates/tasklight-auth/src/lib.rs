// tasklight-auth — authentication core for the Tasklight backend.
//
// Wires together password hashing, the token codec, credential
// authentication, scope-gated identity resolution, delegated-token
// sessions, OAuth verification, and the route handlers.

pub mod authenticator;
pub mod context;
pub mod crypto;
pub mod guard;
pub mod oauth;
pub mod routes;
pub mod session;

pub use context::AuthContext;
pub use crypto::token::{Claims, TokenCodec, TokenError};
pub use guard::{resolve_identity, GuardError};
pub use oauth::{GoogleVerifier, IdentityVerifier, OAuthError, OAuthIdentity};
pub use session::SessionData;
