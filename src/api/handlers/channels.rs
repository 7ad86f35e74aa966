//! Channel CRUD handlers: list, put, del.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::AdminGuard;
use crate::api::dto::{
    ChannelListResponse, DeleteChannelsResponse, PutChannelsResponse, QueryParams, parse_flag,
};
use crate::app_state::AppState;
use crate::domain::ChannelPolicy;
use crate::error::{ErrorResponse, RelayError};

/// `GET|POST /api.v1/channels/list`: List channel names.
#[utoipa::path(
    method(get, post),
    path = "/api.v1/channels/list",
    tag = "Channels",
    summary = "List channels",
    description = "Returns every channel name, sorted ascending.",
    params(
        ("Admin-Token" = String, Header, description = "Shared admin secret"),
    ),
    responses(
        (status = 200, description = "Channel names", body = ChannelListResponse),
        (status = 403, description = "Missing or wrong admin token"),
    )
)]
pub async fn list_channels(_admin: AdminGuard, State(state): State<AppState>) -> impl IntoResponse {
    Json(ChannelListResponse {
        channels: state.relay.list_channels().await,
    })
}

/// `GET|POST /api.v1/channels/put`: Create or replace channels.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] when `name` is missing or the
/// flag parameters are not given once per name.
#[utoipa::path(
    method(get, post),
    path = "/api.v1/channels/put",
    tag = "Channels",
    summary = "Create or replace channels",
    description = "Creates each named channel, replacing any existing channel of the same name. Replacing always starts from an empty subscriber set. Parameters are repeated once per channel; `yes` (any case) sets a flag.",
    params(
        ("Admin-Token" = String, Header, description = "Shared admin secret"),
        ("name" = Vec<String>, Query, description = "Channel name, repeated"),
        ("is-public" = Vec<String>, Query, description = "`yes` lets non-admins subscribe, one per name"),
        ("allow-broadcast" = Vec<String>, Query, description = "`yes` lets non-admins publish, one per name"),
    ),
    responses(
        (status = 200, description = "Channels put", body = PutChannelsResponse),
        (status = 400, description = "Missing or mismatched parameters", body = ErrorResponse),
        (status = 403, description = "Missing or wrong admin token"),
    )
)]
pub async fn put_channels(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, RelayError> {
    let params = QueryParams::new(pairs);
    let names = params.required_all("name")?;
    let is_public = params.required_each("is-public", names.len())?;
    let allow_broadcast = params.required_each("allow-broadcast", names.len())?;

    let mut put = Vec::with_capacity(names.len());
    for ((name, public), broadcast) in names.into_iter().zip(is_public).zip(allow_broadcast) {
        let policy = ChannelPolicy::new(parse_flag(public), parse_flag(broadcast));
        state.relay.put_channel(name, policy).await;
        tracing::info!(channel = name, ?policy, "channel has been put");
        put.push(name.to_string());
    }

    Ok(Json(PutChannelsResponse { put }))
}

/// `GET|POST /api.v1/channels/del`: Delete channels.
///
/// # Errors
///
/// Returns [`RelayError::InvalidRequest`] when `name` is missing.
#[utoipa::path(
    method(get, post),
    path = "/api.v1/channels/del",
    tag = "Channels",
    summary = "Delete channels",
    description = "Deletes each named channel and clears it from every subscriber. Unknown names are skipped.",
    params(
        ("Admin-Token" = String, Header, description = "Shared admin secret"),
        ("name" = Vec<String>, Query, description = "Channel name, repeated"),
    ),
    responses(
        (status = 200, description = "Channels deleted", body = DeleteChannelsResponse),
        (status = 400, description = "Missing parameters", body = ErrorResponse),
        (status = 403, description = "Missing or wrong admin token"),
    )
)]
pub async fn delete_channels(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, RelayError> {
    let params = QueryParams::new(pairs);
    let names = params.required_all("name")?;

    let mut deleted = Vec::with_capacity(names.len());
    for name in names {
        match state.relay.delete_channel(name).await {
            Ok(dropped) => {
                tracing::info!(channel = name, dropped, "channel has been deleted");
                deleted.push(name.to_string());
            }
            Err(e) => tracing::debug!(channel = name, reason = e.reason(), "delete skipped"),
        }
    }

    Ok(Json(DeleteChannelsResponse { deleted }))
}

/// Channel management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/channels/list", get(list_channels).post(list_channels))
        .route("/channels/put", get(put_channels).post(put_channels))
        .route("/channels/del", get(delete_channels).post(delete_channels))
}
