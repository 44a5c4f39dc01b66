//! Invitation domain models and RSVP request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attendance status of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsvpStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "yes partial party attendance")]
    PartialAttendance,
}

impl RsvpStatus {
    pub const ALL: [RsvpStatus; 4] = [
        RsvpStatus::Pending,
        RsvpStatus::Yes,
        RsvpStatus::No,
        RsvpStatus::PartialAttendance,
    ];

    /// Stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Yes => "yes",
            RsvpStatus::No => "no",
            RsvpStatus::PartialAttendance => "yes partial party attendance",
        }
    }

    /// Human-friendly label for the admin console.
    pub fn label(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "Pending",
            RsvpStatus::Yes => "Attending",
            RsvpStatus::No => "Not attending",
            RsvpStatus::PartialAttendance => "Partially attending",
        }
    }
}

impl FromStr for RsvpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        RsvpStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown status code: {}", s))
    }
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The answer a guest submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpResponse {
    Yes,
    No,
}

impl RsvpResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpResponse::Yes => "yes",
            RsvpResponse::No => "no",
        }
    }
}

impl FromStr for RsvpResponse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" => Ok(RsvpResponse::Yes),
            "no" => Ok(RsvpResponse::No),
            _ => Err("Invalid response. Must be 'yes' or 'no'".to_string()),
        }
    }
}

/// One invitation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: i64,
    pub code: String,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub party_size: Option<i32>,
    pub status: RsvpStatus,
    pub rsvped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Public view returned to guests.
    pub fn view(&self) -> InvitationView {
        InvitationView {
            code: self.code.clone(),
            guest_names: self.guest_names.clone(),
            attending_guest_names: self.attending_guest_names.clone(),
            party_size: self.party_size,
            status: self.status,
            status_label: self.status.label().to_string(),
            rsvped_at: self.rsvped_at,
            updated_at: self.updated_at,
        }
    }

    /// Row view for the admin console.
    pub fn admin_view(&self) -> AdminInvitationView {
        AdminInvitationView {
            id: self.id,
            invite_code: self.code.clone(),
            guest_names: self.guest_names.clone(),
            attending_guest_names: self.attending_guest_names.clone(),
            party_size: self.party_size,
            status: self.status,
            status_label: self.status.label().to_string(),
            rsvped_at: self.rsvped_at,
            updated_at: self.updated_at,
        }
    }
}

/// Guest-facing invitation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationView {
    pub code: String,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub party_size: Option<i32>,
    pub status: RsvpStatus,
    pub status_label: String,
    pub rsvped_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/v1/rsvp/:code`.
///
/// `attending_guest_names` distinguishes "omitted" (`None`) from "explicitly empty".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitRsvpRequest {
    pub response: String,
    #[serde(default)]
    pub guest_names: Option<Vec<String>>,
    #[serde(default)]
    pub attending_guest_names: Option<Vec<String>>,
}

/// Result of a recorded RSVP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitRsvpResponse {
    #[serde(flatten)]
    pub invitation: InvitationView,
    /// Whether the operator notification went out. Informational only.
    pub email_sent: bool,
}

/// Admin console row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AdminInvitationView {
    pub id: i64,
    pub invite_code: String,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub party_size: Option<i32>,
    pub status: RsvpStatus,
    pub status_label: String,
    pub rsvped_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A selectable status in the admin console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusOption {
    pub code: String,
    pub label: String,
}

impl StatusOption {
    pub fn all() -> Vec<StatusOption> {
        RsvpStatus::ALL
            .iter()
            .map(|s| StatusOption {
                code: s.as_str().to_string(),
                label: s.label().to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListInvitationsResponse {
    pub items: Vec<AdminInvitationView>,
    pub statuses: Vec<StatusOption>,
}

/// Partial update from the admin console. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateInvitationRequest {
    #[serde(default)]
    pub invite_code: Option<String>,
    /// `Some(None)` clears the party size; `None` leaves it unchanged.
    #[serde(default, deserialize_with = "present_or_null")]
    pub party_size: Option<Option<i32>>,
    #[serde(default)]
    pub guest_names: Option<Vec<String>>,
    #[serde(default)]
    pub attending_guest_names: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateInvitationRequest {
    pub fn has_changes(&self) -> bool {
        self.invite_code.is_some()
            || self.party_size.is_some()
            || self.guest_names.is_some()
            || self.attending_guest_names.is_some()
            || self.status.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInvitationResponse {
    pub item: AdminInvitationView,
}

/// Largest advisory party size an admin may set.
pub const MAX_PARTY_SIZE: i32 = 50;

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Invitation {
        let now = Utc::now();
        Invitation {
            id: 7,
            code: "A007".to_string(),
            guest_names: vec!["Alice".to_string(), "Bob".to_string()],
            attending_guest_names: vec!["Alice".to_string()],
            party_size: Some(2),
            status: RsvpStatus::PartialAttendance,
            rsvped_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in RsvpStatus::ALL {
            assert_eq!(status.as_str().parse::<RsvpStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(" YES ".parse::<RsvpStatus>(), Ok(RsvpStatus::Yes));
        assert_eq!(
            "Yes Partial Party Attendance".parse::<RsvpStatus>(),
            Ok(RsvpStatus::PartialAttendance)
        );
        assert!("maybe".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_to_wire_strings() {
        assert_eq!(
            serde_json::to_string(&RsvpStatus::PartialAttendance).unwrap(),
            "\"yes partial party attendance\""
        );
        assert_eq!(serde_json::to_string(&RsvpStatus::Pending).unwrap(), "\"pending\"");
    }

    #[test]
    fn test_response_parse() {
        assert_eq!("yes".parse::<RsvpResponse>(), Ok(RsvpResponse::Yes));
        assert_eq!(" No ".parse::<RsvpResponse>(), Ok(RsvpResponse::No));
        assert!("maybe".parse::<RsvpResponse>().is_err());
        assert!("".parse::<RsvpResponse>().is_err());
    }

    #[test]
    fn test_submit_request_distinguishes_omitted_from_empty() {
        let omitted: SubmitRsvpRequest = serde_json::from_str(r#"{"response":"yes"}"#).unwrap();
        assert!(omitted.attending_guest_names.is_none());

        let empty: SubmitRsvpRequest =
            serde_json::from_str(r#"{"response":"yes","attending_guest_names":[]}"#).unwrap();
        assert_eq!(empty.attending_guest_names, Some(vec![]));
    }

    #[test]
    fn test_submit_request_rejects_non_string_names() {
        let result: Result<SubmitRsvpRequest, _> =
            serde_json::from_str(r#"{"response":"yes","guest_names":["Alice", 3]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_submit_response_flattens_view() {
        let response = SubmitRsvpResponse {
            invitation: sample().view(),
            email_sent: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "A007");
        assert_eq!(json["status"], "yes partial party attendance");
        assert_eq!(json["status_label"], "Partially attending");
        assert_eq!(json["email_sent"], false);
    }

    #[test]
    fn test_admin_view_uses_invite_code_key() {
        let json = serde_json::to_value(sample().admin_view()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["invite_code"], "A007");
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_update_request_party_size_presence() {
        let absent: UpdateInvitationRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.party_size, None);
        assert!(!absent.has_changes());

        let cleared: UpdateInvitationRequest =
            serde_json::from_str(r#"{"party_size":null}"#).unwrap();
        assert_eq!(cleared.party_size, Some(None));
        assert!(cleared.has_changes());

        let set: UpdateInvitationRequest = serde_json::from_str(r#"{"party_size":4}"#).unwrap();
        assert_eq!(set.party_size, Some(Some(4)));
    }

    #[test]
    fn test_status_options_cover_all_statuses() {
        let options = StatusOption::all();
        assert_eq!(options.len(), 4);
        assert_eq!(options[0].code, "pending");
        assert_eq!(options[3].label, "Partially attending");
    }
}
