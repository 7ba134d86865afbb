//! Packeval daemon: the evaluation session service
//!
//! Serves the REST API over a session service wired to the HTTP reasoning
//! collaborator. The knowledge-base retrieval collaborator is deployed
//! separately and is not wired here.

use clap::Parser;
use packeval_agents::{standard_registry, AgentOptions, HttpReasoningClient};
use packeval_service::api::{create_router, AppState};
use packeval_service::{EvaluationService, ServiceConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Packeval daemon CLI
#[derive(Parser)]
#[command(name = "packevald")]
#[command(about = "Packeval - packaging concept evaluation service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PACKEVAL_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "PACKEVAL_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "PACKEVAL_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "PACKEVAL_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen.parse()?;
    }

    let reasoning = Arc::new(HttpReasoningClient::new(config.reasoning.clone()));
    let agent_options: AgentOptions = config.agents.clone().into();
    let registry = standard_registry(reasoning, None, &agent_options);
    let service = Arc::new(EvaluationService::with_driver_config(
        Arc::new(registry),
        config.driver.clone().into(),
    )?);

    let state = AppState::new(service);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr).await?;
    tracing::info!(
        listen_addr = %config.server.listen_addr,
        model = %config.reasoning.model,
        "packevald listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("packevald stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
