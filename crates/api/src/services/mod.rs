//! Services used by the route handlers.

pub mod admin_auth;
pub mod admin_bootstrap;
pub mod email;

pub use admin_auth::AdminAuthService;
pub use admin_bootstrap::{bootstrap_admin, BootstrapError, BootstrapOutcome};
pub use email::{EmailError, EmailNotifier, EmailProvider};
