//! Domain models for the RSVP backend.

pub mod admin;
pub mod invitation;

pub use admin::{
    AdminLoginRequest, AdminLoginResponse, AdminSession, AdminUser, AdminUserInfo,
    DEFAULT_ADMIN_USERNAME,
};
pub use invitation::{
    AdminInvitationView, Invitation, InvitationView, ListInvitationsResponse, RsvpResponse,
    RsvpStatus, StatusOption, SubmitRsvpRequest, SubmitRsvpResponse, UpdateInvitationRequest,
    UpdateInvitationResponse, MAX_PARTY_SIZE,
};
