//! Records connection pool gauges.

use sqlx::PgPool;
use std::time::Duration;

use super::scheduler::{Job, JobFrequency};

pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Every(Duration::from_secs(15))
    }

    async fn execute(&self) -> anyhow::Result<()> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}
