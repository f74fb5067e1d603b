use anyhow::Context;
use intercom::application::{CallService, LineService, SfuRouter};
use intercom::config::Config;
use intercom::domain::client::ClientRepository;
use intercom::domain::smb::SmbClient;
use intercom::infrastructure::persistence::{
    InMemoryCallRepository, InMemoryClientRepository, InMemoryLineRepository,
};
use intercom::infrastructure::smb::SmbHttpClient;
use intercom::interface::api::{build_router, init_metrics, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SMB_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Intercom");

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    info!("Configuration loaded: {:?}", config.server);

    let line_bridge = config
        .line_bridge()
        .context("at least one media bridge instance must be configured")?;
    for instance in &config.sfu.instances {
        info!(
            "Media bridge {} (max {} conferences)",
            instance.url, instance.max_conferences
        );
    }

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let smb: Arc<dyn SmbClient> = Arc::new(SmbHttpClient::new(SMB_REQUEST_TIMEOUT)?);
    let clients: Arc<dyn ClientRepository> = Arc::new(InMemoryClientRepository::new());
    let router = Arc::new(SfuRouter::new(config.sfu_instances()));

    let calls = CallService::new(
        Arc::new(InMemoryCallRepository::new()),
        clients.clone(),
        smb.clone(),
        router.clone(),
        config.call_settings(),
    );
    let lines = LineService::new(Arc::new(InMemoryLineRepository::new()), smb, line_bridge);

    let state = AppState {
        calls,
        lines,
        clients,
        router,
    };
    let app = build_router(state, prometheus_handle);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("REST API server started on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
