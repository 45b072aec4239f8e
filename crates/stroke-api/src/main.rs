use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stroke_api::config::{ConfigSource, StrokeConfig};
use stroke_api::tracing_setup::{LogFormat, init_tracing};
use stroke_api::{AppState, create_app, startup_error_code};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "stroke")]
#[command(version)]
#[command(about = "Read-only lookup service over the stroke dataset")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (defaults to $STROKE_CONFIG_PATH or stroke.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Dataset file, overriding the configured path
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[arg(long, global = true)]
    host: Option<String>,

    #[arg(long, global = true)]
    port: Option<u16>,

    /// Log output format
    #[arg(long, global = true, value_enum, env = "STROKE_LOG_FORMAT", default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Load the dataset and serve lookups (default)
    Serve,
    /// Load the dataset, print the inferred schema as JSON, and exit
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting stroke lookup service");

    let config = resolve_config(&cli)?;
    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Schema => print_schema(config),
    };

    if let Err(err) = &result {
        match startup_error_code(err) {
            Some(code) => error!(code, "Fatal error: {err:#}"),
            None => error!("Fatal error: {err:#}"),
        }
    }
    result
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StrokeConfig> {
    let (config, source) = StrokeConfig::load(cli.config.as_deref())?;
    match &source {
        ConfigSource::File(path) => info!(path = %path.display(), "Loaded configuration file"),
        ConfigSource::Defaults => info!("Using default configuration"),
    }

    let mut config = config.apply_env();
    if let Some(dataset) = &cli.dataset {
        config.dataset.path = dataset.clone();
    }
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    Ok(config)
}

fn print_schema(config: StrokeConfig) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let summary = serde_json::json!({
        "path": state.config.dataset.path.display().to_string(),
        "records": state.store.len(),
        "unique_ids": state.store.unique_ids(),
        "schema": state.store.schema(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn serve(config: StrokeConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Web server started successfully");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(%err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
