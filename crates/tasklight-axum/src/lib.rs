// Axum integration for Tasklight auth.
//
// Builds the router, reads and writes the signed session cookie, applies
// CORS from configuration, and maps handler errors onto HTTP statuses
// with `WWW-Authenticate` challenges on 401/403 responses.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use tower_http::cors::CorsLayer;

use tasklight_auth::context::AuthContext;
use tasklight_auth::guard::GuardError;
use tasklight_auth::routes;
use tasklight_auth::routes::google::{GoogleAuthError, GoogleAuthRequest};
use tasklight_auth::routes::signup::{SignUpError, SignUpRequest};
use tasklight_auth::routes::token::{LoginError, LoginForm};
use tasklight_auth::session::SessionData;
use tasklight_core::error::{ApiError, ErrorCode};

/// Name of the signed session cookie.
pub const SESSION_COOKIE: &str = "tasklight.session";

// ─── Error Responses ────────────────────────────────────────────

/// A client-visible error response: an `ApiError` body plus an optional
/// `WWW-Authenticate` challenge.
#[derive(Debug)]
pub struct ErrorResponse {
    error: ApiError,
    www_authenticate: Option<String>,
}

impl ErrorResponse {
    fn new(error: ApiError) -> Self {
        Self {
            error,
            www_authenticate: None,
        }
    }

    fn unauthenticated(challenge: String) -> Self {
        Self {
            error: ApiError::unauthorized(ErrorCode::InvalidToken),
            www_authenticate: Some(challenge),
        }
    }

    fn insufficient_scope(challenge: String) -> Self {
        Self {
            error: ApiError::forbidden(ErrorCode::InsufficientScope),
            www_authenticate: Some(challenge),
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.error.to_json())).into_response();
        if let Some(challenge) = self.www_authenticate {
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

impl From<LoginError> for ErrorResponse {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => {
                Self::new(ApiError::bad_request(ErrorCode::InvalidEmailOrPassword))
            }
            LoginError::Upstream(_) => Self::new(ApiError::unavailable()),
            LoginError::Internal(detail) => {
                tracing::error!(%detail, "login handler failed");
                Self::new(ApiError::internal())
            }
        }
    }
}

impl From<SignUpError> for ErrorResponse {
    fn from(e: SignUpError) -> Self {
        match e {
            SignUpError::InvalidEmail => Self::new(ApiError::bad_request(ErrorCode::InvalidEmail)),
            SignUpError::InvalidPassword => {
                Self::new(ApiError::bad_request(ErrorCode::InvalidPassword))
            }
            SignUpError::AlreadyExists => {
                Self::new(ApiError::conflict(ErrorCode::UserAlreadyExists))
            }
            SignUpError::Upstream(_) => Self::new(ApiError::unavailable()),
            SignUpError::Internal(detail) => {
                tracing::error!(%detail, "signup handler failed");
                Self::new(ApiError::internal())
            }
        }
    }
}

impl From<GuardError> for ErrorResponse {
    fn from(e: GuardError) -> Self {
        match e {
            GuardError::Unauthenticated { challenge } => Self::unauthenticated(challenge),
            GuardError::Forbidden { challenge } => Self::insufficient_scope(challenge),
            GuardError::Upstream(_) => Self::new(ApiError::unavailable()),
        }
    }
}

impl From<GoogleAuthError> for ErrorResponse {
    fn from(e: GoogleAuthError) -> Self {
        match e {
            GoogleAuthError::VerificationFailed => Self::unauthenticated("Bearer".to_string()),
            GoogleAuthError::EmailNotVerified => {
                Self::new(ApiError::forbidden(ErrorCode::EmailNotVerified))
            }
            GoogleAuthError::ProviderUnavailable | GoogleAuthError::Upstream(_) => {
                Self::new(ApiError::unavailable())
            }
            GoogleAuthError::Internal(detail) => {
                tracing::error!(%detail, "google handler failed");
                Self::new(ApiError::internal())
            }
        }
    }
}

// ─── Session Cookie Plumbing ────────────────────────────────────

/// Read and open the signed session from the request's Cookie header.
fn read_session(headers: &HeaderMap, secret: &str) -> SessionData {
    let sealed = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let (name, value) = cookie.trim().split_once('=')?;
                (name == SESSION_COOKIE).then(|| value.to_string())
            })
        });
    SessionData::open(sealed.as_deref(), secret)
}

/// Seal the session into a Set-Cookie value.
fn session_set_cookie(session: &SessionData, ctx: &AuthContext) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.seal(&ctx.config.session_secret),
        ctx.config.session_max_age,
    )
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

// ─── Route Handlers ─────────────────────────────────────────────

async fn login(
    State(ctx): State<Arc<AuthContext>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let response = routes::token::handle_login(&ctx, form).await?;
    Ok(Json(response))
}

async fn sign_up(
    State(ctx): State<Arc<AuthContext>>,
    Json(body): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let response = routes::signup::handle_sign_up(&ctx, body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn me(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ErrorResponse> {
    let user = routes::users::handle_me(&ctx, authorization_header(&headers)).await?;
    Ok(Json(user))
}

async fn my_items(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ErrorResponse> {
    let items = routes::users::handle_my_items(&ctx, authorization_header(&headers)).await?;
    Ok(Json(items))
}

async fn google_auth(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
    Json(body): Json<GoogleAuthRequest>,
) -> Result<Response, ErrorResponse> {
    let mut session = read_session(&headers, &ctx.config.session_secret);
    let response = routes::google::handle_google_auth(&ctx, &mut session, body).await?;
    let cookie = session_set_cookie(&session, &ctx);
    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

async fn google_token(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ErrorResponse> {
    let session = read_session(&headers, &ctx.config.session_secret);
    match routes::google::handle_google_token(&session) {
        Some(response) => Ok(Json(response)),
        None => Err(ErrorResponse::unauthenticated("Bearer".to_string())),
    }
}

async fn google_logout(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Response {
    let mut session = read_session(&headers, &ctx.config.session_secret);
    routes::google::handle_google_logout(&mut session);
    let cookie = session_set_cookie(&session, &ctx);
    (
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "ok": true })),
    )
        .into_response()
}

// ─── Router ─────────────────────────────────────────────────────

/// The Tasklight auth integration.
///
/// Owns the shared `AuthContext`; `router()` produces an Axum router
/// ready to merge into an application.
#[derive(Clone)]
pub struct Tasklight {
    ctx: Arc<AuthContext>,
}

impl Tasklight {
    pub fn new(ctx: Arc<AuthContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AuthContext> {
        &self.ctx
    }

    /// Build the auth router with CORS applied from configuration.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/auth/token", post(login))
            .route("/auth/signup", post(sign_up))
            .route("/auth/google", post(google_auth))
            .route("/auth/google/token", get(google_token))
            .route("/auth/google/logout", post(google_logout))
            .route("/users/me", get(me))
            .route("/users/me/items", get(my_items))
            .with_state(self.ctx.clone());

        router.layer(self.cors_layer())
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .ctx
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
