//! Admin session extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use domain::models::AdminSession;
use persistence::repositories::AdminRepository;
use shared::crypto::sha256_hex;

use crate::app::AppState;
use crate::error::ApiError;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// An authenticated admin session.
///
/// Accepts the raw token from `X-Admin-Token` or `Authorization: Bearer`.
/// The token is hashed before lookup; only unexpired sessions match.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub session: AdminSession,
    /// SHA-256 of the presented token, used to revoke it on logout.
    pub token_hash: String,
}

/// Pulls the presented token out of the request headers.
pub fn presented_token(headers: &HeaderMap) -> Option<String> {
    let from_custom = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    };

    from_custom.or_else(from_bearer).map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = presented_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing admin token".to_string()))?;
        let token_hash = sha256_hex(&token);

        let repo = AdminRepository::new(state.pool.clone());
        let session = repo
            .find_session_by_token(&token_hash)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        if let Err(e) = repo.touch_session(session.id).await {
            tracing::warn!(session_id = session.id, error = %e, "Failed to touch admin session");
        }

        Ok(Self {
            session: session.into(),
            token_hash,
        })
    }
}
