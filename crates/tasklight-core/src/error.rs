// Error taxonomy shared across the workspace.
//
// Client-visible failures are `ApiError` (status + code + message);
// internal failures are `AuthError`. Authentication failures collapse to
// generic codes at the boundary so callers cannot distinguish "no such
// user" from "wrong password".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried in error response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidEmailOrPassword,
    InvalidEmail,
    InvalidPassword,
    UserAlreadyExists,
    EmailNotVerified,
    InvalidToken,
    InsufficientScope,
    NotFound,
    CouldNotParseBody,
    UpstreamUnavailable,
    InternalServerError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidEmailOrPassword => "Incorrect email or password",
            Self::InvalidEmail => "Invalid email address",
            Self::InvalidPassword => "Invalid password",
            Self::UserAlreadyExists => "User already exists",
            Self::EmailNotVerified => "Email not verified",
            Self::InvalidToken => "Could not validate credentials",
            Self::InsufficientScope => "Not enough permissions",
            Self::NotFound => "Not found",
            Self::CouldNotParseBody => "Could not parse body",
            Self::UpstreamUnavailable => "Service temporarily unavailable",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used by the API error system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    InternalServerError = 500,
    ServiceUnavailable = 503,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// A client-visible error: HTTP status, error code, and message.
///
/// The message defaults to the code's display text; boundaries must not
/// put root-cause detail in here (that belongs in logs).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    pub fn bad_request(code: ErrorCode) -> Self {
        Self::new(HttpStatus::BadRequest, code)
    }

    pub fn unauthorized(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Unauthorized, code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Forbidden, code)
    }

    pub fn conflict(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Conflict, code)
    }

    pub fn unavailable() -> Self {
        Self::new(HttpStatus::ServiceUnavailable, ErrorCode::UpstreamUnavailable)
    }

    pub fn internal() -> Self {
        Self::new(HttpStatus::InternalServerError, ErrorCode::InternalServerError)
    }

    /// Build the JSON body for the error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Internal (non-HTTP) error for configuration and crypto failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for tasklight operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpStatus::Unauthorized.status_code(), 401);
        assert_eq!(HttpStatus::Forbidden.status_code(), 403);
        assert_eq!(HttpStatus::Conflict.status_code(), 409);
    }

    #[test]
    fn test_api_error_json() {
        let err = ApiError::unauthorized(ErrorCode::InvalidToken);
        let body = err.to_json();
        assert_eq!(body["code"], "INVALID_TOKEN");
        assert_eq!(body["message"], "Could not validate credentials");
    }

    #[test]
    fn test_generic_credential_message() {
        // Unknown-user and wrong-password must share one message.
        let err = ApiError::bad_request(ErrorCode::InvalidEmailOrPassword);
        assert_eq!(err.message, "Incorrect email or password");
    }
}
