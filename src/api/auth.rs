//! Admin credential check for the administrative API.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::error::RelayError;

/// Header carrying the shared admin secret.
pub const ADMIN_TOKEN_HEADER: &str = "Admin-Token";

/// Extractor that only succeeds when the request carries a valid
/// [`ADMIN_TOKEN_HEADER`]. Rejects with [`RelayError::Forbidden`], which
/// renders as an empty 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = RelayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if state.relay.authenticator().verify(token) {
            Ok(Self)
        } else {
            tracing::debug!(reason = "forbidden", "admin api request rejected");
            Err(RelayError::Forbidden)
        }
    }
}
