//! OpenAPI document for the administrative API.

use utoipa::OpenApi;

use crate::api::dto::{
    ChannelListResponse, DeleteChannelsResponse, PutChannelsResponse, SubscriptionResponse,
};
use crate::api::handlers::{channels, clients, system};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "subsocket",
        description = "Administrative API of the subsocket pub/sub relay"
    ),
    paths(
        system::health_handler,
        channels::list_channels,
        channels::put_channels,
        channels::delete_channels,
        clients::subscribe_client,
        clients::unsubscribe_client,
    ),
    components(schemas(
        system::HealthResponse,
        ChannelListResponse,
        PutChannelsResponse,
        DeleteChannelsResponse,
        SubscriptionResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Channels", description = "Channel definitions"),
        (name = "Clients", description = "Out-of-band subscription changes"),
    )
)]
pub struct ApiDoc;
