use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::{HeaderValue, Method, StatusCode, Uri},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use nearbyaid_shared::constants::APP_NAME;
use nearbyaid_shared::protocol::{
    AuthResponse, CreateAidRequest, CreateAidResponse, LoginRequest, NearbyResponse,
    RegisterRequest,
};
use nearbyaid_shared::validation::{validate_login, validate_registration};
use nearbyaid_store::{Database, NewUser};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::aid::{self, NearbyParams, NearbyQuery};
use crate::auth::{self, require_auth, AuthUser, TokenService};
use crate::config::ServerConfig;
use crate::error::{error_detail_middleware, ServerError};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub tokens: TokenService,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_days),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let origin = match state.config.cors_allow_origin.as_deref() {
        None => AllowOrigin::from(Any),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(value = %origin, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
                AllowOrigin::from(Any)
            }
        },
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let protected = Router::new()
        .route("/api/aid", post(create_aid))
        .route("/api/protected", get(protected_check))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/aid/nearby", get(nearby))
        .merge(protected)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.config.environment,
            error_detail_middleware,
        ))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct WelcomeResponse {
    success: bool,
    message: String,
    status: &'static str,
    time: String,
}

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    timestamp: String,
}

#[derive(Serialize)]
struct ProtectedResponse {
    success: bool,
    message: &'static str,
    user_id: Uuid,
}

async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        success: true,
        message: format!("Welcome to {APP_NAME} API!"),
        status: "running",
        time: Utc::now().to_rfc3339(),
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn protected_check(Extension(user): Extension<AuthUser>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        success: true,
        message: "Welcome to protected route!",
        user_id: user.user_id,
    })
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

async fn nearby(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyResponse>, ServerError> {
    let Query(params) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let query = NearbyQuery::from_params(&params)?;

    let db = state.db.lock().await;
    let response = aid::find_nearby(&db, &query)?;
    Ok(Json(response))
}

async fn create_aid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<CreateAidRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateAidResponse>), ServerError> {
    let Json(req) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let db = state.db.lock().await;
    let aid = aid::create_aid(&db, user.user_id, &req)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAidResponse {
            success: true,
            message: "Help point created successfully".to_string(),
            aid,
        }),
    ))
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    let Json(req) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let registration = validate_registration(&req)?;

    let password = registration.password;
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))??;

    let created = {
        let db = state.db.lock().await;
        db.create_user(&NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
        })
    };
    let user =
        created.map_err(|e| ServerError::from_store("Server error during registration", e))?;

    info!(user_id = %user.id, "User registered");

    let token = state.tokens.issue(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            token,
            user: user.summary(),
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ServerError> {
    let Json(req) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let (email, password) = validate_login(&req)?;
    let invalid = || ServerError::Unauthorized("invalid email or password".to_string());

    let found = {
        let db = state.db.lock().await;
        db.find_user_by_email(&email)
    };
    let user = found
        .map_err(|e| ServerError::from_store("Server error during login", e))?
        .ok_or_else(invalid)?;

    let stored_hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || {
        auth::verify_password(&password, &stored_hash)
    })
    .await
    .map_err(|e| ServerError::Internal(format!("Hashing task failed: {e}")))??;
    if !matches {
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id)?;
    Ok(Json(AuthResponse {
        success: true,
        token,
        user: user.summary(),
    }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
