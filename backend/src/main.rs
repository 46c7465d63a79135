use loan_servicing::config::AppConfig;
use loan_servicing::{create_router, initialize_backend};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Unknown failures are fatal; a supervisor restarts the process
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Unrecoverable panic, shutting down: {}", panic_info);
        std::process::exit(1);
    }));

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config)?;

    let addr = config.socket_addr()?;
    info!("Starting server on {}", addr);
    info!(
        "Max upload: {}MB, CORS origin: {}",
        config.max_upload_mb, config.cors_origin
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            error!("Failed to listen for Ctrl+C, graceful shutdown disabled: {}", e);
            std::future::pending::<()>().await
        }
    }
}
