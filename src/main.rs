use std::sync::Arc;

use medipay::app_state::AppState;
use medipay::config::Config;
use medipay::routes::create_router;
use medipay::services::{MessageActivityProbe, RefundSweep};
use medipay::utils::SystemClock;
use migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,medipay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MediPay Backend (medipay)");

    // Load configuration
    let config = Config::load()?;

    tracing::info!(
        "Loaded configuration - Server: {}:{}",
        config.server.host,
        config.server.port
    );

    if config.refund_policy.email_enabled {
        tracing::warn!(
            "Email delivery is not wired in this deployment; notifications stay on the in-process channels"
        );
    }

    // Initialize application state
    let state = AppState::new(config.clone()).await?;

    tracing::info!("Initialized application state");

    // Apply pending migrations
    migration::Migrator::up(&state.db, None).await?;

    tracing::info!("Database migrations applied");

    // Spawn the refund eligibility sweep
    let probe = Arc::new(MessageActivityProbe::new(state.db.clone()));
    let sweep = Arc::new(RefundSweep::new(
        &config.refund_policy,
        state.purchase_service.clone(),
        state.refund_service.clone(),
        probe,
        Arc::new(SystemClock),
    ));
    tokio::spawn(sweep.run());

    // Create router
    let app = create_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
