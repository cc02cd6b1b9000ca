use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use domain::services::Mailer;
use tracing::{info, warn};

use scholarsync_api::{
    app,
    config::Config,
    jobs::{expiry_sweep, AccountExpiryJob, JobScheduler, PoolMetricsJob},
    middleware,
    services::{EmailService, MailQueue},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting ScholarSync API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let (mail_queue, mail_worker) = MailQueue::start(EmailService::new(config.email.clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(mail_queue);

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    if config.expiry.enabled {
        scheduler.register(AccountExpiryJob::new(
            expiry_sweep(&pool, mailer.clone(), config.expiry.thresholds()),
            config.expiry.interval_hours,
        ));
    } else {
        info!("Scheduled account expiry disabled");
    }
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool, mailer);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;

    // Every mailer clone is gone once the router and jobs are dropped.
    if tokio::time::timeout(Duration::from_secs(10), mail_worker.drain())
        .await
        .is_err()
    {
        warn!("Timed out delivering queued email");
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
