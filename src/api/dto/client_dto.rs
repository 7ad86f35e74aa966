//! Client subscription administration response types.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body of `clients/subscribe` and `clients/unsubscribe`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    /// Client id as given in the request.
    pub client_id: String,
    /// Channel name as given in the request.
    pub channel: String,
    /// `false` when the client or the channel does not exist.
    pub applied: bool,
    /// `true` when the membership actually changed.
    pub changed: bool,
}
