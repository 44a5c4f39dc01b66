//! Creates the first admin account on startup.

use domain::models::DEFAULT_ADMIN_USERNAME;
use persistence::repositories::AdminRepository;
use shared::password::{hash_password, PasswordError};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),
}

/// What [`bootstrap_admin`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// At least one admin already exists.
    AlreadyPresent,
    /// No admin exists and no bootstrap password is configured.
    NotConfigured,
    Created { username: String },
}

fn bootstrap_username(config: &AdminConfig) -> &str {
    let name = config.bootstrap_username.trim();
    if name.is_empty() {
        DEFAULT_ADMIN_USERNAME
    } else {
        name
    }
}

/// Creates one admin from configuration when the admins table is empty.
/// Idempotent: does nothing once any admin exists.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    let repo = AdminRepository::new(pool.clone());

    if repo.count_admins().await? > 0 {
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    if config.bootstrap_password.is_empty() {
        warn!(
            "No admin account exists and RSVP__ADMIN__BOOTSTRAP_PASSWORD is empty; \
             the admin API is unusable until one is created"
        );
        return Ok(BootstrapOutcome::NotConfigured);
    }

    let username = bootstrap_username(config);
    let password_hash = hash_password(&config.bootstrap_password)?;
    let admin = repo.create_admin(username, &password_hash).await?;

    info!(admin_id = admin.id, username = %admin.username, "Bootstrap admin created");
    warn!("Remove RSVP__ADMIN__BOOTSTRAP_PASSWORD from the environment after initial setup");

    Ok(BootstrapOutcome::Created {
        username: admin.username,
    })
}
