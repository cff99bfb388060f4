use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared secret for mutating requests.
pub const AUTH_HEADER: &str = "X-Custom-Auth-Key";

/// Proof that the request carried the correct shared secret.
///
/// Add this as a handler parameter to require admin authentication.
#[derive(Debug)]
pub struct AdminKey;

/// Compare the inbound secret header byte-for-byte against the configured
/// secret. Fails with NOT_CONFIGURED when no secret is configured and
/// UNAUTHORIZED when the header is missing or wrong; nothing about the
/// expected value is leaked either way.
pub fn require_shared_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let secret = state
        .config
        .gateway
        .shared_secret
        .as_deref()
        .ok_or_else(|| AppError::NotConfigured("Shared secret is not configured".into()))?;

    let provided = headers
        .get(AUTH_HEADER)
        .ok_or(AppError::Unauthorized)?
        .as_bytes();

    if provided != secret.as_bytes() {
        return Err(AppError::Unauthorized);
    }

    Ok(())
}

impl FromRequestParts<AppState> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_shared_secret(state, &parts.headers)?;
        Ok(AdminKey)
    }
}
