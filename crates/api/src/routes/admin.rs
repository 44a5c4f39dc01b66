//! Admin console routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::{
    AdminLoginRequest, AdminLoginResponse, Invitation, ListInvitationsResponse, RsvpStatus,
    StatusOption, UpdateInvitationRequest, UpdateInvitationResponse, MAX_PARTY_SIZE,
};
use domain::services::InvitationPatch;
use persistence::repositories::{InvitationLookup, InvitationRepository};
use shared::validation::{
    normalize_invite_code, sanitize_guest_names_lenient, INVALID_INVITE_CODE,
};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AdminAuth, ApiJson, ClientInfo};
use crate::middleware::KeyedRateLimiter;
use crate::services::AdminAuthService;

/// Exchange admin credentials for a session token.
///
/// POST /api/v1/admin/auth
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ApiJson(request): ApiJson<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>, ApiError> {
    let request = request.normalized();

    if let Some(limiter) = &state.login_limiter {
        limiter.enforce(&KeyedRateLimiter::key(&client.ip, &request.username))?;
    }

    request.validate()?;

    let service = AdminAuthService::new(state.pool.clone(), state.config.admin.session_ttl_secs);
    let response = service.login(&request.username, &request.password).await?;
    Ok(Json(response))
}

/// Revoke the presented session.
///
/// POST /api/v1/admin/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AdminAuth,
) -> Result<StatusCode, ApiError> {
    AdminAuthService::new(state.pool.clone(), state.config.admin.session_ttl_secs)
        .logout(&auth.token_hash)
        .await?;

    info!(admin_id = auth.session.admin_id, "Admin logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// All invitations ordered by code, with the selectable statuses.
///
/// GET /api/v1/admin/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    _auth: AdminAuth,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    let items = InvitationRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|row| Invitation::from(row).admin_view())
        .collect();

    Ok(Json(ListInvitationsResponse {
        items,
        statuses: StatusOption::all(),
    }))
}

/// Validates an admin update into a patch.
pub fn parse_patch(request: &UpdateInvitationRequest) -> Result<InvitationPatch, ApiError> {
    if !request.has_changes() {
        return Err(ApiError::Validation("No updatable fields provided".to_string()));
    }

    let code = request
        .invite_code
        .as_deref()
        .map(|raw| {
            normalize_invite_code(raw)
                .ok_or_else(|| ApiError::Validation(INVALID_INVITE_CODE.to_string()))
        })
        .transpose()?;

    if let Some(Some(size)) = request.party_size {
        if !(0..=MAX_PARTY_SIZE).contains(&size) {
            return Err(ApiError::Validation(format!(
                "party_size must be between 0 and {}",
                MAX_PARTY_SIZE
            )));
        }
    }

    let status = request
        .status
        .as_deref()
        .map(|raw| raw.parse::<RsvpStatus>().map_err(ApiError::Validation))
        .transpose()?;

    Ok(InvitationPatch {
        code,
        party_size: request.party_size,
        guest_names: request
            .guest_names
            .as_deref()
            .map(sanitize_guest_names_lenient),
        attending_guest_names: request
            .attending_guest_names
            .as_deref()
            .map(sanitize_guest_names_lenient),
        status,
    })
}

/// Partially update one invitation.
///
/// PATCH /api/v1/admin/invitations/:id
pub async fn update_invitation(
    State(state): State<AppState>,
    auth: AdminAuth,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateInvitationRequest>,
) -> Result<Json<UpdateInvitationResponse>, ApiError> {
    let patch = parse_patch(&request)?;
    let now = Utc::now();

    let updated = InvitationRepository::new(state.pool.clone())
        .update_locked(InvitationLookup::Id(id), |row| {
            let mut invitation = Invitation::from(row);
            patch.apply(&mut invitation, now);
            Ok::<_, ApiError>(invitation.into())
        })
        .await
        .map_err(|e| match e {
            ApiError::Conflict(_) => ApiError::Conflict("Invite code already in use".to_string()),
            other => other,
        })?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    let invitation = Invitation::from(updated);
    info!(
        admin_id = auth.session.admin_id,
        invitation_id = invitation.id,
        code = %invitation.code,
        status = %invitation.status,
        "Invitation updated by admin"
    );

    Ok(Json(UpdateInvitationResponse {
        item: invitation.admin_view(),
    }))
}
