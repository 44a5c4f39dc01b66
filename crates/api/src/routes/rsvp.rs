//! Guest-facing RSVP routes.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::models::{
    Invitation, InvitationView, RsvpResponse, SubmitRsvpRequest, SubmitRsvpResponse,
};
use domain::services::{resolve_rsvp, NotificationResult, RsvpNotice, RsvpSubmission};
use persistence::repositories::{InvitationLookup, InvitationRepository};
use shared::validation::{
    normalize_invite_code, sanitize_guest_names_strict, INVALID_INVITE_CODE,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ClientInfo};
use crate::middleware::{metrics::record_rsvp_submission, KeyedRateLimiter};

fn parse_code(raw: &str) -> Result<String, ApiError> {
    normalize_invite_code(raw).ok_or_else(|| ApiError::Validation(INVALID_INVITE_CODE.to_string()))
}

/// Validates a raw request into a submission for the resolver.
///
/// Both name lists go through the strict sanitizer, so `attending_guest_names`
/// carries the same 20-name and 400-character caps as `guest_names`.
pub fn parse_submission(request: &SubmitRsvpRequest) -> Result<RsvpSubmission, ApiError> {
    let response: RsvpResponse = request.response.parse().map_err(ApiError::Validation)?;

    let sanitize = |names: &Option<Vec<String>>| {
        names
            .as_deref()
            .map(sanitize_guest_names_strict)
            .transpose()
            .map_err(|e| ApiError::Validation(e.to_string()))
    };

    Ok(RsvpSubmission {
        response,
        guest_names: sanitize(&request.guest_names)?,
        attending_guest_names: sanitize(&request.attending_guest_names)?,
    })
}

/// Current state of an invitation.
///
/// GET /api/v1/rsvp/:code
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InvitationView>, ApiError> {
    let code = parse_code(&code)?;

    let invitation: Invitation = InvitationRepository::new(state.pool.clone())
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite code not found".to_string()))?
        .into();

    Ok(Json(invitation.view()))
}

/// Record a guest's response.
///
/// POST /api/v1/rsvp/:code
///
/// The read, resolution and write happen under a row lock, so concurrent
/// submissions for one code are applied one after another.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    client: ClientInfo,
    Path(code): Path<String>,
    ApiJson(request): ApiJson<SubmitRsvpRequest>,
) -> Result<Json<SubmitRsvpResponse>, ApiError> {
    let code = parse_code(&code)?;

    if let Some(limiter) = &state.rsvp_limiter {
        limiter.enforce(&KeyedRateLimiter::key(&client.ip, &code))?;
    }

    let submission = parse_submission(&request)?;
    let received_at = Utc::now();

    let updated = InvitationRepository::new(state.pool.clone())
        .update_locked(InvitationLookup::Code(&code), |mut row| {
            let outcome = resolve_rsvp(&row.guest_names, row.rsvped_at, &submission, received_at);
            row.guest_names = outcome.guest_names;
            row.attending_guest_names = outcome.attending_guest_names;
            row.status = outcome.status.as_str().to_string();
            row.rsvped_at = Some(outcome.rsvped_at);
            row.updated_at = outcome.updated_at;
            Ok::<_, ApiError>(row)
        })
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite code not found".to_string()))?;

    let invitation: Invitation = updated.into();
    record_rsvp_submission(invitation.status.as_str());
    info!(
        code = %invitation.code,
        response = submission.response.as_str(),
        status = %invitation.status,
        attending = invitation.attending_guest_names.len(),
        "RSVP recorded"
    );

    let notice = RsvpNotice::from_invitation(
        &invitation,
        Some(client.ip),
        client.user_agent,
        received_at,
    );
    let email_sent = notify(&state, &notice).await.is_sent();

    Ok(Json(SubmitRsvpResponse {
        invitation: invitation.view(),
        email_sent,
    }))
}

/// Awaits the notifier, bounded by the time a primary and a fallback attempt
/// may take together.
async fn notify(state: &AppState, notice: &RsvpNotice) -> NotificationResult {
    let bound = Duration::from_millis(state.config.notification.timeout_ms.max(1) * 2);

    let result = match tokio::time::timeout(bound, state.notifier.notify(notice)).await {
        Ok(result) => result,
        Err(_) => NotificationResult::Failed(format!("Timed out after {:?}", bound)),
    };

    if let NotificationResult::Failed(reason) = &result {
        warn!(code = %notice.code, error = %reason, "RSVP notification not delivered");
    }
    result
}
