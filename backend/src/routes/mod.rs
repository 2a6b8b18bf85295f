//! Route definitions for the Estoque platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::store::PgStockStore;
use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Everything else requires a bearer token
        .merge(protected_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/company",
            get(handlers::get_company).put(handlers::update_company),
        )
        .nest("/categories", category_routes())
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest(
            "/movements",
            handlers::movement_routes::<PgStockStore, AppState>(),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Category routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_categories).post(handlers::create_category),
    )
}

/// User management routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:user_id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
}

/// Product catalogue routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/summary", get(handlers::product_summary))
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
}
