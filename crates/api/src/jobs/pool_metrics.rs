//! Connection pool gauges for the `/metrics` endpoint.

use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};

/// Seconds between samples; kept below a typical Prometheus scrape interval.
const SAMPLE_INTERVAL_SECS: u64 = 15;

/// Samples pool size and idle connections into gauges.
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
        JobFrequency::Seconds(SAMPLE_INTERVAL_SECS)
    }

    // Reading pool counters never touches the database.
    async fn execute(&self) -> Result<(), String> {
        persistence::metrics::record_pool_metrics(&self.pool);
        Ok(())
    }
}
