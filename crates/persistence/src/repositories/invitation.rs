//! Invitation repository for database operations.

use sqlx::PgPool;

use crate::entities::InvitationEntity;
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str = "id, code, guest_names, attending_guest_names, party_size, status, rsvped_at, created_at, updated_at";

/// How to find the row to lock in [`InvitationRepository::update_locked`].
#[derive(Debug, Clone, Copy)]
pub enum InvitationLookup<'a> {
    Id(i64),
    Code(&'a str),
}

/// Repository for invitation database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an invitation by its (normalized) code.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_code");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All invitations, ordered by code.
    pub async fn list_all(&self) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations ORDER BY code ASC"
        ))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a pending invitation. Used for seeding.
    pub async fn create(
        &self,
        code: &str,
        guest_names: &[String],
        party_size: Option<i32>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO invitations (code, guest_names, party_size)
            VALUES ($1, $2, $3)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(code)
        .bind(guest_names)
        .bind(party_size)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_by_code(&self, code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_invitation_by_code");
        let result = sqlx::query("DELETE FROM invitations WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Read-modify-write one invitation under a row lock.
    ///
    /// The row is selected `FOR UPDATE`, handed to `apply`, and every mutable
    /// column of the returned entity is written back in the same transaction.
    /// Concurrent updates of the same invitation are serialized; the second
    /// one observes the first one's result. Returns `Ok(None)` when no row
    /// matches. An error from `apply` rolls the transaction back.
    pub async fn update_locked<F, E>(
        &self,
        lookup: InvitationLookup<'_>,
        apply: F,
    ) -> Result<Option<InvitationEntity>, E>
    where
        F: FnOnce(InvitationEntity) -> Result<InvitationEntity, E>,
        E: From<sqlx::Error>,
    {
        let timer = QueryTimer::new("update_invitation_locked");
        let mut tx = self.pool.begin().await?;

        let current = match lookup {
            InvitationLookup::Id(id) => {
                sqlx::query_as::<_, InvitationEntity>(&format!(
                    "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1 FOR UPDATE"
                ))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
            }
            InvitationLookup::Code(code) => {
                sqlx::query_as::<_, InvitationEntity>(&format!(
                    "SELECT {INVITATION_COLUMNS} FROM invitations WHERE code = $1 FOR UPDATE"
                ))
                .bind(code)
                .fetch_optional(&mut *tx)
                .await?
            }
        };

        let Some(current) = current else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        let id = current.id;
        let next = apply(current)?;

        let updated = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            UPDATE invitations
            SET code = $2,
                guest_names = $3,
                attending_guest_names = $4,
                party_size = $5,
                status = $6,
                rsvped_at = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&next.code)
        .bind(&next.guest_names)
        .bind(&next.attending_guest_names)
        .bind(next.party_size)
        .bind(&next.status)
        .bind(next.rsvped_at)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(updated))
    }
}
