//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/register          - Create identity + customer, return tokens
//! POST /auth/login             - Exchange credentials for tokens
//! POST /auth/token/refresh     - Exchange refresh token for access token
//! GET  /auth/me                - Current identity's profile
//!
//! # Orders (bearer required, owner-scoped)
//! GET    /orders               - List own orders, newest first
//! POST   /orders               - Place an order (dispatches SMS receipt)
//! GET    /orders/{id}          - Retrieve own order
//! PUT    /orders/{id}          - Edit own order
//! PATCH  /orders/{id}          - Edit own order (partial)
//! DELETE /orders/{id}          - Delete own order
//!
//! # Customers (bearer required, owner-scoped)
//! GET    /customers            - List own profile (zero or one)
//! POST   /customers            - Create profile if account predates one
//! GET    /customers/{id}       - Retrieve own profile
//! PUT    /customers/{id}       - Update phone/code
//! PATCH  /customers/{id}       - Update phone/code (partial)
//! DELETE /customers/{id}       - Delete profile and its orders
//! ```
//!
//! Cross-owner access to any order or customer returns 404, identical to a
//! genuinely missing resource.

pub mod auth;
pub mod customers;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route(
            "/{id}",
            get(orders::show)
                .put(orders::update)
                .patch(orders::update)
                .delete(orders::destroy),
        )
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .patch(customers::update)
                .delete(customers::destroy),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .nest("/customers", customer_routes())
}
