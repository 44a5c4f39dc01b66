//! Admin account and session entities.

use chrono::{DateTime, Utc};
use domain::models::{AdminSession, AdminUser};
use sqlx::FromRow;

/// Database row mapping for the admins table.
#[derive(Debug, Clone, FromRow)]
pub struct AdminUserEntity {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminUserEntity> for AdminUser {
    fn from(entity: AdminUserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            password_hash: entity.password_hash,
            created_at: entity.created_at,
        }
    }
}

/// A session joined with its admin's username.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSessionEntity {
    pub id: i64,
    pub admin_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<AdminSessionEntity> for AdminSession {
    fn from(entity: AdminSessionEntity) -> Self {
        Self {
            session_id: entity.id,
            admin_id: entity.admin_id,
            username: entity.username,
            expires_at: entity.expires_at,
        }
    }
}
