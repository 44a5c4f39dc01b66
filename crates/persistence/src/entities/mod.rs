//! Database entity definitions (row mappings).

pub mod admin;
pub mod invitation;

pub use admin::{AdminSessionEntity, AdminUserEntity};
pub use invitation::InvitationEntity;
