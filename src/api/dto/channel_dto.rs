//! Channel administration request/response types.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body of `channels/list`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelListResponse {
    /// Channel names, sorted ascending.
    pub channels: Vec<String>,
}

/// Response body of `channels/put`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PutChannelsResponse {
    /// Channels created or replaced, in request order.
    pub put: Vec<String>,
}

/// Response body of `channels/del`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteChannelsResponse {
    /// Channels that existed and were deleted, in request order.
    pub deleted: Vec<String>,
}

/// Parses a `yes`/`no` flag. Anything other than a case-insensitive `yes`
/// is `false`.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("yes")
}
