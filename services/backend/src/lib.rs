// Library interface for backend - exposes modules for testing

pub mod config;
pub mod domain;
pub mod errors;
pub mod extractors;
pub mod games;
pub mod handlers;
pub mod repository;
pub mod services;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
        // Account directory
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/verify/:token", get(handlers::auth::verify_email))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/auth/resend-verification",
            post(handlers::auth::resend_verification),
        )
        .route(
            "/api/auth/reset-password/:token",
            post(handlers::auth::reset_password),
        )
        // Settlement
        .route("/api/game/result", post(handlers::game::submit_result))
        .route("/api/game/history", get(handlers::game::history))
        // Users
        .route("/api/user/me", get(handlers::user::me))
        // Metrics
        .route("/metrics", get(handlers::metrics::metrics_handler))
        // State
        .with_state(state)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
