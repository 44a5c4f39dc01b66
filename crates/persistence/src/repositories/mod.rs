//! Repository implementations for database operations.

pub mod admin;
pub mod invitation;

pub use admin::AdminRepository;
pub use invitation::{InvitationLookup, InvitationRepository};
