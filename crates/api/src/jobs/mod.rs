//! Background job scheduler and job implementations.

mod account_expiry;
mod pool_metrics;
mod scheduler;

pub use account_expiry::{expiry_sweep, run_account_expiry, AccountExpiryJob};
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
