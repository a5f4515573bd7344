// tasklight-core — shared types for the Tasklight auth subsystem.
//
// Errors, configuration, data models, logging setup, and the credential
// store contract. No I/O beyond environment reads.

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod store;

pub use config::AuthConfig;
pub use error::{ApiError, AuthError, ErrorCode, HttpStatus, Result};
pub use models::{PublicUser, User};
pub use store::{NewUser, OAuthProfile, StoreError, StoreResult, UserStore};
