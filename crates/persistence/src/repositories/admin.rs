//! Admin account and session repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::{AdminSessionEntity, AdminUserEntity};
use crate::metrics::QueryTimer;

/// Repository for admin accounts and their sessions.
///
/// Sessions are looked up by the SHA-256 hex digest of their token; raw
/// tokens never reach this layer.
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn count_admins(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_admins");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn create_admin(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_admin");
        let result = sqlx::query_as::<_, AdminUserEntity>(
            r#"
            INSERT INTO admins (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AdminUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_admin_by_username");
        let result = sqlx::query_as::<_, AdminUserEntity>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM admins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create_session(
        &self,
        admin_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("create_admin_session");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO admin_sessions (admin_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(admin_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an unexpired session by token hash.
    pub async fn find_session_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<AdminSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_admin_session");
        let result = sqlx::query_as::<_, AdminSessionEntity>(
            r#"
            SELECT s.id, s.admin_id, a.username, s.expires_at
            FROM admin_sessions s
            JOIN admins a ON a.id = s.admin_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn touch_session(&self, session_id: i64) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("touch_admin_session");
        let result = sqlx::query("UPDATE admin_sessions SET last_used_at = NOW() WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn delete_session_by_token(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_admin_session");
        let result = sqlx::query("DELETE FROM admin_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Remove expired sessions, returning how many were deleted.
    pub async fn delete_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_admin_sessions");
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
