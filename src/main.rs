// SPDX-License-Identifier: MIT

//! Ad Account Auditor API server.

use adaudit::{
    config::Config,
    db::Store,
    services::{jobs, AnalysisClient, JobQueue},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Ad Account Auditor API");

    let store = Store::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    // Fail audits orphaned by a previous process before accepting work
    let reconciled = jobs::reconcile_stuck_audits(&store, config.stuck_audit_timeout_minutes)
        .await
        .expect("Startup reconciliation failed");
    if reconciled > 0 {
        tracing::warn!(reconciled, "Reconciled orphaned audits");
    }

    let analysis = Arc::new(AnalysisClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));

    let jobs = JobQueue::start(store.clone(), analysis.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        analysis,
        jobs,
    });

    let app = adaudit::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adaudit=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
