//! Query and pool metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Publishes pool size gauges. Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one named query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_student_by_id");
/// let result = sqlx::query_as::<_, StudentEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records `database_query_duration_seconds` only.
    pub fn record(self) {
        histogram!("database_query_duration_seconds", "query" => self.query)
            .record(self.start.elapsed().as_secs_f64());
    }

    /// Records the duration and counts failures in `database_query_errors_total`,
    /// then hands the result back.
    pub fn finish<T>(self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        if result.is_err() {
            counter!("database_query_errors_total", "query" => self.query).increment(1);
        }
        self.record();
        result
    }
}
