//! Administrative endpoint handlers organized by resource.

pub mod channels;
pub mod clients;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all administrative routes under `/api.v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(channels::routes())
        .merge(clients::routes())
}
