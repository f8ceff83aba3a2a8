use devkit::config::Config;
use devkit::server::{build_router, AppState};
use devkit::util::init_tracing;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("FATAL: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        model = %config.gemini_model,
        web_dir = %config.web_dir.display(),
        "Configuration loaded"
    );
    if !config.web_dir.is_dir() {
        tracing::warn!(
            "Web directory {} does not exist; static files will 404",
            config.web_dir.display()
        );
    }

    let state = Arc::new(AppState::from_config(&config));
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr.as_str()).await?;
    tracing::info!("DevKit listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("DevKit stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
