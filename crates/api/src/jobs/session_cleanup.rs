//! Deletes expired admin sessions.

use persistence::repositories::AdminRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

pub struct SessionCleanupJob {
    repo: AdminRepository,
}

impl SessionCleanupJob {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: AdminRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Job for SessionCleanupJob {
    fn name(&self) -> &'static str {
        "session_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> anyhow::Result<()> {
        let deleted = self.repo.delete_expired_sessions().await?;
        if deleted > 0 {
            info!(deleted, "Expired admin sessions removed");
        }
        Ok(())
    }
}
