//! RSVP resolution.
//!
//! Turns a guest's submission into the invitation's next attendance state.
//! Pure: no I/O, no clock access. The caller supplies the stored guest list,
//! the stored `rsvped_at` and the current time, and persists the outcome.
//!
//! Decision table for a `yes` with `n` listed guests and `k` of them selected:
//!
//! | k        | n     | status                          | attending  |
//! |----------|-------|---------------------------------|------------|
//! | 0        | 1     | `yes`                           | the guest  |
//! | 0        | != 1  | `no`                            | empty      |
//! | n        | > 0   | `yes`                           | everyone   |
//! | 0 < k < n|       | `yes partial party attendance`  | selection  |
//!
//! A `no` always clears attendance.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::models::{RsvpResponse, RsvpStatus};

/// A validated guest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpSubmission {
    pub response: RsvpResponse,
    /// Replacement guest list. Empty counts as not supplied.
    pub guest_names: Option<Vec<String>>,
    /// `None` when the field was absent from the request.
    pub attending_guest_names: Option<Vec<String>>,
}

impl RsvpSubmission {
    pub fn yes() -> Self {
        Self {
            response: RsvpResponse::Yes,
            guest_names: None,
            attending_guest_names: None,
        }
    }

    pub fn no() -> Self {
        Self {
            response: RsvpResponse::No,
            guest_names: None,
            attending_guest_names: None,
        }
    }

    pub fn with_guest_names(mut self, names: Vec<String>) -> Self {
        self.guest_names = Some(names);
        self
    }

    pub fn with_attending(mut self, names: Vec<String>) -> Self {
        self.attending_guest_names = Some(names);
        self
    }

    fn replacement_guest_names(&self) -> Option<&Vec<String>> {
        self.guest_names.as_ref().filter(|names| !names.is_empty())
    }
}

/// The state an invitation moves to after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpOutcome {
    pub status: RsvpStatus,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub rsvped_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolve a submission against the invitation's stored guest list.
pub fn resolve_rsvp(
    current_guest_names: &[String],
    current_rsvped_at: Option<DateTime<Utc>>,
    submission: &RsvpSubmission,
    now: DateTime<Utc>,
) -> RsvpOutcome {
    let guest_names = submission
        .replacement_guest_names()
        .cloned()
        .unwrap_or_else(|| current_guest_names.to_vec());

    let (status, attending_guest_names) = match submission.response {
        RsvpResponse::No => (RsvpStatus::No, Vec::new()),
        RsvpResponse::Yes => {
            let claimed = submission
                .attending_guest_names
                .as_deref()
                .unwrap_or_default();
            resolve_attendance(&guest_names, claimed)
        }
    };

    RsvpOutcome {
        status,
        guest_names,
        attending_guest_names,
        rsvped_at: current_rsvped_at.unwrap_or(now),
        updated_at: now,
    }
}

fn resolve_attendance(listed: &[String], claimed: &[String]) -> (RsvpStatus, Vec<String>) {
    let selected = select_listed(listed, claimed);

    match (selected.len(), listed.len()) {
        (0, 1) => (RsvpStatus::Yes, listed.to_vec()),
        (0, _) => (RsvpStatus::No, Vec::new()),
        (k, n) if k == n => (RsvpStatus::Yes, selected),
        _ => (RsvpStatus::PartialAttendance, selected),
    }
}

/// Members of `listed` that appear in `claimed`, in `listed` order.
fn select_listed(listed: &[String], claimed: &[String]) -> Vec<String> {
    let claimed: HashSet<&str> = claimed.iter().map(String::as_str).collect();
    listed
        .iter()
        .filter(|name| claimed.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Bring an admin-edited attending list back in line with the invitation.
///
/// Drops names that are not invited and clears the list for `no`.
pub fn reconcile_attending(
    guest_names: &[String],
    attending_guest_names: &[String],
    status: RsvpStatus,
) -> Vec<String> {
    if status == RsvpStatus::No {
        return Vec::new();
    }
    let invited: HashSet<&str> = guest_names.iter().map(String::as_str).collect();
    attending_guest_names
        .iter()
        .filter(|name| invited.contains(name.as_str()))
        .cloned()
        .collect()
}
