//! Drops idle keys from the in-memory rate limiters.

use std::sync::Arc;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::KeyedRateLimiter;

pub struct RateLimitPruneJob {
    limiters: Vec<Arc<KeyedRateLimiter>>,
}

impl RateLimitPruneJob {
    pub fn new(limiters: impl IntoIterator<Item = Arc<KeyedRateLimiter>>) -> Self {
        Self {
            limiters: limiters.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl Job for RateLimitPruneJob {
    fn name(&self) -> &'static str {
        "rate_limit_prune"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> anyhow::Result<()> {
        for limiter in &self.limiters {
            let removed = limiter.prune();
            debug!(removed, remaining = limiter.len(), "Rate limiter pruned");
        }
        Ok(())
    }
}
