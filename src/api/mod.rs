//! Administrative REST API: route handlers, DTOs, and router composition.
//!
//! Channel and subscription endpoints are mounted under `/api.v1` and
//! require the `Admin-Token` header. `/health` sits at the root.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api.v1", handlers::routes())
        .merge(handlers::system::routes())
}
