// Edgeline server - edge masks for the headset, stores on disk

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgeline_server::config_loader::{self, Args};
use edgeline_server::http::{create_router, ApiState};
use edgeline_store::{Mailbox, StoreLayout};
use edgeline_vision::{EdgeDetector, SobelDetector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = config_loader::resolve(&args)?;

    info!("Starting edgeline-server v{}", env!("CARGO_PKG_VERSION"));

    let layout = StoreLayout::open(&config.data_dir)?;

    // One detector for the process lifetime, injected everywhere it is
    // needed. Swap in a HED-backed implementation here when a model is
    // available.
    let detector: Arc<dyn EdgeDetector> = Arc::new(SobelDetector::new());
    let mailbox = Arc::new(Mailbox::new(
        layout,
        detector,
        config.save_probability_map,
    ));

    let state = ApiState {
        mailbox,
        max_upload_bytes: config.max_upload_bytes,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
