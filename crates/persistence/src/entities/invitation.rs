//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Invitation, RsvpStatus};
use sqlx::FromRow;

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: i64,
    pub code: String,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub party_size: Option<i32>,
    pub status: String,
    pub rsvped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvitationEntity {
    pub fn rsvp_status(&self) -> RsvpStatus {
        self.status.parse().unwrap_or_else(|_| {
            tracing::warn!(code = %self.code, status = %self.status, "Unknown stored RSVP status");
            RsvpStatus::Pending
        })
    }
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        let status = entity.rsvp_status();
        Self {
            id: entity.id,
            code: entity.code,
            guest_names: entity.guest_names,
            attending_guest_names: entity.attending_guest_names,
            party_size: entity.party_size,
            status,
            rsvped_at: entity.rsvped_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<Invitation> for InvitationEntity {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            code: invitation.code,
            guest_names: invitation.guest_names,
            attending_guest_names: invitation.attending_guest_names,
            party_size: invitation.party_size,
            status: invitation.status.as_str().to_string(),
            rsvped_at: invitation.rsvped_at,
            created_at: invitation.created_at,
            updated_at: invitation.updated_at,
        }
    }
}
