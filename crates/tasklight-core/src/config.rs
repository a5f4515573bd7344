// AuthConfig — the process-wide configuration struct.
//
// Loaded once at startup from the environment and treated as immutable
// thereafter. Builder methods exist for tests and embedders.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

/// Top-level configuration for the auth subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Secret key for signing access tokens (min 32 chars in production).
    pub secret: String,

    /// Signing algorithm name (fixed server-side; default: "HS256").
    /// Verification always uses this value, never the token's own header.
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Access token time-to-live in minutes (default: 30).
    #[serde(default = "default_token_ttl_minutes")]
    pub access_token_ttl_minutes: u64,

    /// Google OAuth client ID.
    #[serde(default)]
    pub google_client_id: String,

    /// Google OAuth client secret.
    #[serde(default)]
    pub google_client_secret: String,

    /// Secret for signing the browser session cookie.
    /// Exposure of this value exposes every delegated token held in a
    /// live session.
    pub session_secret: String,

    /// Session cookie max-age in seconds (default: 1209600 = 14 days).
    #[serde(default = "default_session_max_age")]
    pub session_max_age: u64,

    /// Allowed cross-origin request sources.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl_minutes() -> u64 {
    30
}

fn default_session_max_age() -> u64 {
    1_209_600 // 14 days
}

impl AuthConfig {
    /// Create a config with the two required secrets and defaults for
    /// everything else.
    pub fn new(secret: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: default_algorithm(),
            access_token_ttl_minutes: default_token_ttl_minutes(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            session_secret: session_secret.into(),
            session_max_age: default_session_max_age(),
            cors_origins: Vec::new(),
        }
    }

    /// Load configuration from the environment.
    ///
    /// Reads `SECRET_KEY`, `ALGORITHM`, `ACCESS_TOKEN_EXPIRE_MINUTES`,
    /// `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `SESSION_SECRET`,
    /// `SESSION_MAX_AGE`, and `CORS_ORIGINS` (comma-separated).
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("SECRET_KEY")
            .map_err(|_| AuthError::Config("SECRET_KEY is not set".into()))?;
        let session_secret = std::env::var("SESSION_SECRET")
            .map_err(|_| AuthError::Config("SESSION_SECRET is not set".into()))?;

        let mut config = Self::new(secret, session_secret);

        if let Ok(alg) = std::env::var("ALGORITHM") {
            config.algorithm = alg;
        }
        if let Ok(minutes) = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            config.access_token_ttl_minutes = minutes
                .parse()
                .map_err(|_| AuthError::Config("ACCESS_TOKEN_EXPIRE_MINUTES is not a number".into()))?;
        }
        if let Ok(id) = std::env::var("GOOGLE_CLIENT_ID") {
            config.google_client_id = id;
        }
        if let Ok(secret) = std::env::var("GOOGLE_CLIENT_SECRET") {
            config.google_client_secret = secret;
        }
        if let Ok(max_age) = std::env::var("SESSION_MAX_AGE") {
            config.session_max_age = max_age
                .parse()
                .map_err(|_| AuthError::Config("SESSION_MAX_AGE is not a number".into()))?;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(AuthError::Config("signing secret must not be empty".into()));
        }
        if self.session_secret.is_empty() {
            return Err(AuthError::Config("session secret must not be empty".into()));
        }
        if self.access_token_ttl_minutes == 0 {
            return Err(AuthError::Config("token TTL must be positive".into()));
        }
        Ok(())
    }

    pub fn algorithm(mut self, alg: impl Into<String>) -> Self {
        self.algorithm = alg.into();
        self
    }

    pub fn token_ttl_minutes(mut self, minutes: u64) -> Self {
        self.access_token_ttl_minutes = minutes;
        self
    }

    pub fn google_client(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.google_client_id = id.into();
        self.google_client_secret = secret.into();
        self
    }

    pub fn cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }
}
