//! Estoque - multi-tenant stock management backend
//!
//! Companies register, manage their users, categories and products, and
//! record stock entries and exits. Movements are applied by
//! [`services::MovementService`], which keeps product quantities, the
//! movement log and per-user withdrawal counters consistent.

use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod validation;

pub use crate::config::Config;

use services::MovementService;
use store::PgStockStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub movements: MovementService<PgStockStore>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        Self {
            movements: MovementService::new(PgStockStore::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for MovementService<PgStockStore> {
    fn from_ref(state: &AppState) -> Self {
        state.movements.clone()
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Estoque API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
