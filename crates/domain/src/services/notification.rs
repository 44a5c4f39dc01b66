//! Operator notifications for recorded RSVPs.
//!
//! Delivery is best effort: a notifier reports how it went, it never fails the
//! submission that triggered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::models::{Invitation, RsvpStatus};

/// Everything the operator is told about one recorded response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RsvpNotice {
    pub code: String,
    pub status: RsvpStatus,
    pub guest_names: Vec<String>,
    pub attending_guest_names: Vec<String>,
    pub party_size: Option<i32>,
    pub rsvped_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl RsvpNotice {
    pub fn from_invitation(
        invitation: &Invitation,
        client_ip: Option<String>,
        user_agent: Option<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code: invitation.code.clone(),
            status: invitation.status,
            guest_names: invitation.guest_names.clone(),
            attending_guest_names: invitation.attending_guest_names.clone(),
            party_size: invitation.party_size,
            rsvped_at: invitation.rsvped_at,
            updated_at: invitation.updated_at,
            client_ip,
            user_agent,
            received_at,
        }
    }

    /// Attending guests when there are any, otherwise everyone invited.
    fn headline_names(&self) -> &[String] {
        if self.attending_guest_names.is_empty() {
            &self.guest_names
        } else {
            &self.attending_guest_names
        }
    }

    pub fn subject(&self) -> String {
        let base = format!(
            "RSVP Response Received - {}",
            self.status.as_str().to_uppercase()
        );
        let names = self.headline_names();
        if names.is_empty() {
            format!("{} - Invite Code {}", base, self.code)
        } else {
            format!("{} - Guest(s) {}", base, names.join(", "))
        }
    }

    pub fn body(&self) -> String {
        let list = |names: &[String]| {
            if names.is_empty() {
                "(none)".to_string()
            } else {
                names.join(", ")
            }
        };
        let timestamp = |t: Option<DateTime<Utc>>| {
            t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "n/a".to_string())
        };

        [
            "An RSVP response was recorded:".to_string(),
            String::new(),
            format!("Code: {}", self.code),
            format!("Guests: {}", list(&self.guest_names)),
            format!("Attending: {}", list(&self.attending_guest_names)),
            format!("Response: {}", self.status),
            format!(
                "Party size: {}",
                self.party_size
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "n/a".to_string())
            ),
            format!("RSVPed at: {}", timestamp(self.rsvped_at)),
            format!("Updated at: {}", self.updated_at.to_rfc3339()),
            String::new(),
            format!("IP: {}", self.client_ip.as_deref().unwrap_or("unknown")),
            format!(
                "User-Agent: {}",
                self.user_agent.as_deref().unwrap_or("unknown")
            ),
            format!("Time: {}", self.received_at.to_rfc3339()),
        ]
        .join("\n")
    }
}

/// Result of a notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationResult {
    Sent,
    /// Delivery failed on every configured channel.
    Failed(String),
    /// Notifications are turned off.
    Skipped,
}

impl NotificationResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationResult::Sent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationResult::Sent => "sent",
            NotificationResult::Failed(_) => "failed",
            NotificationResult::Skipped => "skipped",
        }
    }
}

/// Sends RSVP notices to the operator.
#[async_trait::async_trait]
pub trait RsvpNotifier: Send + Sync {
    async fn notify(&self, notice: &RsvpNotice) -> NotificationResult;
}

/// Records notices in memory instead of sending them.
#[derive(Debug, Default)]
pub struct MockNotifier {
    pub simulate_failure: bool,
    sent: Mutex<Vec<RsvpNotice>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notices accepted so far.
    pub fn sent(&self) -> Vec<RsvpNotice> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RsvpNotifier for MockNotifier {
    async fn notify(&self, notice: &RsvpNotice) -> NotificationResult {
        if self.simulate_failure {
            tracing::warn!(code = %notice.code, "Mock notifier simulating failure");
            return NotificationResult::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            code = %notice.code,
            status = %notice.status,
            "Mock: would send RSVP notification"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice.clone());
        }
        NotificationResult::Sent
    }
}
