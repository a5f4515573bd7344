// Minimal Tasklight auth server backed by the in-memory store.
//
// Required environment: SECRET_KEY, SESSION_SECRET.
// Optional: ALGORITHM, ACCESS_TOKEN_EXPIRE_MINUTES, GOOGLE_CLIENT_ID,
// GOOGLE_CLIENT_SECRET, SESSION_MAX_AGE, CORS_ORIGINS, RUST_LOG.

use std::sync::Arc;

use tasklight_auth::context::AuthContext;
use tasklight_auth::oauth::GoogleVerifier;
use tasklight_axum::Tasklight;
use tasklight_core::config::AuthConfig;
use tasklight_core::logger;
use tasklight_memory::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_logging();

    let config = AuthConfig::from_env()?;
    let verifier = GoogleVerifier::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );
    let ctx = AuthContext::new(config, Arc::new(MemoryStore::new()), Arc::new(verifier))?;

    let app = Tasklight::new(ctx).router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
    tracing::info!("listening on http://127.0.0.1:8000");
    axum::serve(listener, app).await?;
    Ok(())
}
