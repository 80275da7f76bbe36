//! HTTP routes

pub mod auth;
pub mod health;
pub mod pages;
pub mod randoms;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    auth::{require_auth, restore_session},
    state::AppState,
};

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    // Public pages and form endpoints
    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/signup", get(pages::signup))
        .route("/missingpermission", get(pages::missing_permission))
        .route("/info", get(pages::info))
        .route("/api/randoms", get(randoms::randoms))
        .route("/signupForm", post(auth::signup_form))
        .route("/loginForm", post(auth::login_form))
        .route("/logout", post(auth::logout));

    // Guarded pages: only reachable with an authenticated session
    let guarded_routes = Router::new()
        .route("/perfil", get(pages::perfil))
        .route("/logout", get(pages::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(health_routes)
        .merge(public_routes)
        .merge(guarded_routes)
        // Session restoration runs before the guard on every request
        .layer(middleware::from_fn_with_state(state.clone(), restore_session))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}
