//! One-shot account expiry sweep for external schedulers (cron and the like).

use std::sync::Arc;

use anyhow::Result;
use domain::services::Mailer;

use scholarsync_api::{
    config::Config,
    jobs::{expiry_sweep, run_account_expiry},
    middleware,
    services::{EmailService, MailQueue},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    middleware::logging::init_logging(&config.logging);

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;
    persistence::db::run_migrations(&pool).await?;

    let (mail_queue, mail_worker) = MailQueue::start(EmailService::new(config.email.clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(mail_queue);

    let sweep = expiry_sweep(&pool, mailer, config.expiry.thresholds());
    let report = run_account_expiry(&sweep).await.map_err(anyhow::Error::msg)?;

    // Let queued warnings go out before exiting.
    drop(sweep);
    mail_worker.drain().await;

    println!("Successfully processed accounts: {}.", report);
    Ok(())
}
