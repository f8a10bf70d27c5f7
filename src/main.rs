//! Navalha Maintenance Daemon
//!
//! Periodically cancels scheduled appointments whose date has passed,
//! annotating each with the cancellation reason. The request-facing API
//! runs elsewhere; this binary owns the background sweep.

use navalha_core::{AppConfig, Clock, SystemClock};
use navalha_db::{
    create_pool, PgAppointmentRepository, PgAuditSink, PgLoyaltyRepository, PgStaffRepository,
    PgVoucherConfigRepository,
};
use navalha_services::{AppointmentManager, LoyaltyService};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "navalha={},navalha_services={},navalha_db={},sqlx=warn",
            log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!(
        "Starting Navalha maintenance daemon v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = AppConfig::load()?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let appointments = Arc::new(PgAppointmentRepository::new(pool.clone()));
    let staff = Arc::new(PgStaffRepository::new(pool.clone()));
    let loyalty_repo = Arc::new(PgLoyaltyRepository::new(pool.clone()));
    let configs = Arc::new(PgVoucherConfigRepository::new(pool.clone()));
    let audit = Arc::new(PgAuditSink::new(pool.clone()));

    let loyalty = LoyaltyService::new(loyalty_repo, configs, clock.clone());
    let manager = AppointmentManager::new(appointments, staff, loyalty, audit, clock.clone());

    let interval = Duration::from_secs(config.sweep.interval_secs);
    info!("Sweeping stale appointments every {:?}", interval);

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;

        match manager.expire_stale(clock.now()).await {
            Ok(0) => info!("Sweep complete, nothing to cancel"),
            Ok(cancelled) => info!("Sweep complete, {} appointments cancelled", cancelled),
            Err(e) => error!("Sweep failed: {}", e),
        }
    }
}
