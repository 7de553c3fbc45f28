// Library crate for the pre-rendering URL shortener
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod queue;
pub mod render;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{generate_short_code, health_check, redirect, service_status};
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health & monitoring
        .route("/health", get(health_check))
        .route("/status", get(service_status))
        // Links
        .route("/generate", post(generate_short_code))
        .route("/{short_code}", get(redirect))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
