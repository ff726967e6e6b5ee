//! Orderdesk - Inventory & Order Management Service
//!
//! REST backend for a small storefront: accounts, product catalog, and an
//! order ledger that reserves and restores product stock.
//!
//! ## Features
//! - Bearer-token authentication (signup, login, profile)
//! - Product catalog management
//! - Order placement with stock reservation
//! - Stock restoration on order amendment and deletion
//! - Admin-gated user listing

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod workflow;

use auth::TokenKeys;
use store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub keys: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, keys: TokenKeys) -> Self {
        Self {
            store,
            keys: Arc::new(keys),
        }
    }
}

/// Builds the full router. Signup, login and the health probe are open;
/// everything else wants a bearer token.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "orderdesk"})) }))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/profile", get(routes::auth::profile))
        .route("/products", get(routes::products::list_products).post(routes::products::create_product))
        .route("/products/:id", get(routes::products::get_product).put(routes::products::update_product).delete(routes::products::delete_product))
        .route("/orders", get(routes::orders::list_orders).post(routes::orders::create_order))
        .route("/orders/user/:id", get(routes::orders::list_user_orders))
        .route("/orders/:id", put(routes::orders::update_order).delete(routes::orders::delete_order))
        .route("/users", get(routes::users::list_users))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
