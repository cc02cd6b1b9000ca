//! Periodic account expiry sweep.

use std::sync::Arc;

use chrono::Utc;
use domain::services::{ExpirySweep, ExpiryThresholds, Mailer, SweepReport};
use persistence::repositories::StudentRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_expiry_sweep;

/// Wire the sweep to the Postgres stores.
pub fn expiry_sweep(
    pool: &PgPool,
    mailer: Arc<dyn Mailer>,
    thresholds: ExpiryThresholds,
) -> ExpirySweep {
    ExpirySweep::new(
        Arc::new(StudentRepository::new(pool.clone())),
        mailer,
        thresholds,
    )
}

/// Run one sweep now and record its metrics.
pub async fn run_account_expiry(sweep: &ExpirySweep) -> Result<SweepReport, String> {
    let report = sweep
        .run(Utc::now())
        .await
        .map_err(|e| format!("Failed to list approved accounts: {}", e))?;

    record_expiry_sweep(&report);
    Ok(report)
}

/// Background job that warns, deactivates and deletes aging accounts.
pub struct AccountExpiryJob {
    sweep: ExpirySweep,
    interval_hours: u64,
}

impl AccountExpiryJob {
    pub fn new(sweep: ExpirySweep, interval_hours: u64) -> Self {
        Self {
            sweep,
            interval_hours: interval_hours.max(1),
        }
    }
}

#[async_trait::async_trait]
impl Job for AccountExpiryJob {
    fn name(&self) -> &'static str {
        "account_expiry"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hours(self.interval_hours)
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        run_account_expiry(&self.sweep).await.map(|_| ())
    }
}
