//! Binary for the forecast service.

use anyhow::Context;
use clap::Parser;
use weather_api::Environment;

const DEFAULT_LOG_FILTER: &str = "weather_api=info,tower_http=info";

#[derive(Debug, Parser)]
#[command(name = "weather-api", version, about = "Weather forecast service")]
struct Args {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// Hosting environment; health endpoints are only mapped in Development.
    #[arg(long, env = "APP_ENVIRONMENT", default_value = Environment::DEVELOPMENT)]
    environment: String,

    /// Log level filter (e.g. "weather_api=debug,tower_http=debug").
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _telemetry =
        weather_core::telemetry::init_tracing("weather-api", args.log_level.as_deref(), DEFAULT_LOG_FILTER)?;

    let environment = Environment::new(args.environment);
    let app = weather_api::app(&environment);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        environment = %environment,
        "forecast service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("forecast service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
