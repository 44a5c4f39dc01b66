//! Admin edits to an invitation.

use chrono::{DateTime, Utc};

use crate::models::{Invitation, RsvpStatus};
use crate::services::rsvp_resolution::reconcile_attending;

/// A validated partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationPatch {
    pub code: Option<String>,
    /// `Some(None)` clears the party size.
    pub party_size: Option<Option<i32>>,
    pub guest_names: Option<Vec<String>>,
    pub attending_guest_names: Option<Vec<String>>,
    pub status: Option<RsvpStatus>,
}

impl InvitationPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch and restores the attendance invariants.
    ///
    /// Attending guests are filtered to the guest list. An explicit `yes`
    /// without an attending list marks every guest as attending. An attending
    /// status is then re-derived from the attending and listed counts.
    /// `rsvped_at` is left alone.
    pub fn apply(&self, invitation: &mut Invitation, now: DateTime<Utc>) {
        if let Some(code) = &self.code {
            invitation.code = code.clone();
        }
        if let Some(party_size) = self.party_size {
            invitation.party_size = party_size;
        }
        if let Some(guest_names) = &self.guest_names {
            invitation.guest_names = guest_names.clone();
        }
        if let Some(attending) = &self.attending_guest_names {
            invitation.attending_guest_names = attending.clone();
        }
        if let Some(status) = self.status {
            invitation.status = status;
            if status == RsvpStatus::Yes && self.attending_guest_names.is_none() {
                invitation.attending_guest_names = invitation.guest_names.clone();
            }
        }

        invitation.attending_guest_names = reconcile_attending(
            &invitation.guest_names,
            &invitation.attending_guest_names,
            invitation.status,
        );
        invitation.status = attending_status(
            invitation.status,
            invitation.guest_names.len(),
            invitation.attending_guest_names.len(),
        );
        invitation.updated_at = now;
    }
}

/// Status consistent with `attending` of `listed` guests.
///
/// Only `yes` and partial attendance depend on the counts: everyone attending
/// is `yes`, some is partial, nobody is `no`. `pending` and `no` are kept.
fn attending_status(status: RsvpStatus, listed: usize, attending: usize) -> RsvpStatus {
    match status {
        RsvpStatus::Yes | RsvpStatus::PartialAttendance => match attending {
            0 => RsvpStatus::No,
            k if k == listed => RsvpStatus::Yes,
            _ => RsvpStatus::PartialAttendance,
        },
        other => other,
    }
}
