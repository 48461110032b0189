//! RiskGuard fraud scoring HTTP server

use anyhow::Result;
use chrono::Utc;
use riskguard_runtime::rules::load_patterns_file;
use riskguard_runtime::MemoryVelocityStore;
use riskguard_sdk::{FraudEngine, FraudEngineBuilder};
use riskguard_server::{create_router, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!("Loaded configuration: {:?}", config);

    let velocity = Arc::new(MemoryVelocityStore::new());
    let engine = Arc::new(init_engine(&config, velocity.clone()).await?);
    info!("Fraud engine initialized");

    if let Some(interval) = config.escalation_interval() {
        spawn_escalation_task(engine.clone(), velocity, interval);
    }

    let app = create_router(engine);

    // Start server
    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Metrics: http://{}/metrics", addr);
    info!("  Score API: POST http://{}/v1/score", addr);
    info!("  Transactions: POST http://{}/v1/transactions", addr);
    info!("  Cases: http://{}/v1/cases/:case_number", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_engine(
    config: &ServerConfig,
    velocity: Arc<MemoryVelocityStore>,
) -> Result<FraudEngine> {
    let mut builder = FraudEngineBuilder::new()
        .with_config(config.engine.clone())
        .with_velocity_store(velocity);

    if let Some(path) = &config.patterns_file {
        builder = builder.add_patterns(load_patterns_file(path).await?);
    }

    Ok(builder.build().await?)
}

/// Periodic rescan of overdue alerts plus velocity counter cleanup
fn spawn_escalation_task(
    engine: Arc<FraudEngine>,
    velocity: Arc<MemoryVelocityStore>,
    interval: Duration,
) {
    info!(interval_secs = interval.as_secs(), "Escalation rescan scheduled");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match engine.escalate_pending().await {
                Ok(cases) if !cases.is_empty() => {
                    info!(escalated = cases.len(), "Escalation rescan opened cases")
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Escalation rescan failed"),
            }
            let purged = velocity.purge_expired(Utc::now());
            if purged > 0 {
                info!(purged, "Purged expired velocity counters");
            }
        }
    });
}

/// Initialize tracing subscriber; `RUST_LOG` overrides `log_level`
fn init_tracing(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "riskguard_server={level},riskguard_sdk={level},riskguard_runtime={level},tower_http=debug",
                    level = log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
