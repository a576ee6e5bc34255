use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::{require_session, AuthManager};
use crate::config::{Config, LogFormat};
use crate::database::{self, Database};
use crate::routes::{
    auth, distribusi,
    kategori::{self, MustahikCategories, MuzakkiCategories},
    mustahik, muzakki, penerimaan, periode, statistik, unit, user,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthManager>,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            auth: Arc::new(AuthManager::new(&config.jwt_secret, config.session_ttl)),
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Arc<AuthManager> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Connects, migrates and optionally seeds the database.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let pool = database::create_database_connection(config).await?;
    database::run_migrations(&pool).await?;
    if config.seed_default_users {
        database::seed_default_users(&pool).await?;
    }
    Ok(AppState::new(pool, config))
}

async fn handle_404() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Endpoint tidak ditemukan."
        })),
    )
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_allow.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .cors_allow
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// All `/api` routes; everything except sign-in needs a session.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/session", get(auth::get_session))
        .nest("/muzakki", muzakki::router())
        .nest("/mustahik", mustahik::router())
        .nest("/muzakki-category", kategori::router::<MuzakkiCategories>())
        .nest("/mustahik-category", kategori::router::<MustahikCategories>())
        .nest("/zakat-period", periode::router())
        .nest("/zakat-unit", unit::router())
        .nest("/zakat-record", penerimaan::router())
        .nest("/zakat-distribution", distribusi::router())
        .nest("/statistic", statistik::router())
        .nest("/user", user::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/auth/signin", post(auth::signin))
        .merge(protected)
        .fallback(handle_404)
        .with_state(state)
}

pub fn app_router(state: AppState, config: &Config) -> Router {
    // Bundle frontend, index.html untuk route di sisi klien
    let serve_dir = ServeDir::new(&config.static_dir).not_found_service(ServeFile::new(
        format!("{}/index.html", config.static_dir),
    ));

    Router::new()
        .nest("/api", api_router(state))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}
