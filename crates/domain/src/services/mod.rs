//! Domain services for the RSVP backend.
//!
//! Services contain business logic that operates on domain models.

pub mod invitation_update;
pub mod notification;
pub mod rsvp_resolution;

pub use invitation_update::InvitationPatch;
pub use notification::{MockNotifier, NotificationResult, RsvpNotice, RsvpNotifier};
pub use rsvp_resolution::{reconcile_attending, resolve_rsvp, RsvpOutcome, RsvpSubmission};
