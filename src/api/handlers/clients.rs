//! Out-of-band subscription handlers.
//!
//! These call the same subscription manager as the socket protocol but
//! skip the public/private gate.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::AdminGuard;
use crate::api::dto::{QueryParams, SubscriptionResponse};
use crate::app_state::AppState;
use crate::domain::ClientId;
use crate::error::{ErrorResponse, RelayError};
use crate::service::Privacy;

#[derive(Debug, Clone, Copy)]
enum Change {
    Subscribe,
    Unsubscribe,
}

/// `GET|POST /api.v1/clients/subscribe`: Subscribe a client to a channel.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] when `client-id` or `channel`
/// is missing.
#[utoipa::path(
    method(get, post),
    path = "/api.v1/clients/subscribe",
    tag = "Clients",
    summary = "Subscribe a client",
    description = "Adds a connected client to a channel regardless of the channel's public flag. An unknown client or channel leaves `applied` false.",
    params(
        ("Admin-Token" = String, Header, description = "Shared admin secret"),
        ("client-id" = String, Query, description = "Connected client id"),
        ("channel" = String, Query, description = "Channel name"),
    ),
    responses(
        (status = 200, description = "Request processed", body = SubscriptionResponse),
        (status = 400, description = "Missing parameters", body = ErrorResponse),
        (status = 403, description = "Missing or wrong admin token"),
    )
)]
pub async fn subscribe_client(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, RelayError> {
    apply(&state, &QueryParams::new(pairs), Change::Subscribe).await
}

/// `GET|POST /api.v1/clients/unsubscribe`: Unsubscribe a client from a
/// channel.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] when `client-id` or `channel`
/// is missing.
#[utoipa::path(
    method(get, post),
    path = "/api.v1/clients/unsubscribe",
    tag = "Clients",
    summary = "Unsubscribe a client",
    description = "Removes a connected client from a channel regardless of the channel's public flag. An unknown client or channel leaves `applied` false.",
    params(
        ("Admin-Token" = String, Header, description = "Shared admin secret"),
        ("client-id" = String, Query, description = "Connected client id"),
        ("channel" = String, Query, description = "Channel name"),
    ),
    responses(
        (status = 200, description = "Request processed", body = SubscriptionResponse),
        (status = 400, description = "Missing parameters", body = ErrorResponse),
        (status = 403, description = "Missing or wrong admin token"),
    )
)]
pub async fn unsubscribe_client(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, RelayError> {
    apply(&state, &QueryParams::new(pairs), Change::Unsubscribe).await
}

async fn apply(
    state: &AppState,
    params: &QueryParams,
    change: Change,
) -> Result<Json<SubscriptionResponse>, RelayError> {
    let client_id = params.required("client-id")?;
    let channel = params.required("channel")?;

    let result = match client_id.parse::<ClientId>() {
        Ok(id) => {
            let subs = state.relay.subscriptions();
            match change {
                Change::Subscribe => subs.subscribe(id, channel, Privacy::Bypass).await,
                Change::Unsubscribe => subs.unsubscribe(id, channel, Privacy::Bypass).await,
            }
        }
        Err(e) => Err(e),
    };

    let (applied, changed) = match result {
        Ok(changed) => (true, changed),
        Err(e) => {
            tracing::debug!(client_id, channel, reason = e.reason(), "subscription change ignored");
            (false, false)
        }
    };

    Ok(Json(SubscriptionResponse {
        client_id: client_id.to_string(),
        channel: channel.to_string(),
        applied,
        changed,
    }))
}

/// Client subscription routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/clients/subscribe",
            get(subscribe_client).post(subscribe_client),
        )
        .route(
            "/clients/unsubscribe",
            get(unsubscribe_client).post(unsubscribe_client),
        )
}
