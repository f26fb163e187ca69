use receivable_service::config::ReceivableConfig;
use receivable_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ReceivableConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        port = config.common.port,
        cache_refresh_seconds = config.cache_refresh_seconds,
        "Starting receivable-service"
    );

    let application = Application::build(config).await?;

    tokio::select! {
        result = application.run_until_stopped() => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping service");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
