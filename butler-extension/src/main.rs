use anyhow::Context;
use butler_client::JenkinsClient;
use butler_core::JobServerClient;
use butler_extension::api::{self, AppState};
use butler_extension::config::Config;
use butler_extension::service::{DiscoveryService, ExecutionController};
use clap::Parser;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "butler_extension=info,butler_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    tracing::info!("Starting Butler Extension...");
    tracing::info!("Jenkins: {}", config.base_url);
    tracing::info!("Job start timeout: {:?}", config.job_start_timeout());

    let jenkins = JenkinsClient::with_options(&config.base_url, config.client_options())
        .context("Failed to create Jenkins client")?;
    jenkins
        .connect()
        .await
        .context("Failed to connect to Jenkins")?;
    let client: Arc<dyn JobServerClient> = Arc::new(jenkins);

    let discovery = Arc::new(DiscoveryService::new(
        client.clone(),
        config.discovery_attributes_excludes_job.clone(),
    ));
    discovery.clone().spawn_refresh(config.discovery_interval());

    let ready = Arc::new(AtomicBool::new(false));
    let app = api::create_router(AppState {
        discovery,
        execution: Arc::new(ExecutionController::new(client)),
        start_timeout: config.job_start_timeout(),
        ready: ready.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);
    ready.store(true, Ordering::SeqCst);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Butler Extension stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
