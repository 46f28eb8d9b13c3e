//! PopModel REST API entry point.
//!
//! Binary name: `popmodel`
//!
//! Parses configuration from flags and environment, wires application
//! state, then serves the HTTP API (and the SPA build, when present).

mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use popmodel_infra::fs::resolve_data_dir;

use state::{AppState, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "popmodel", version, about = "PopModel chat backend")]
struct Cli {
    /// Bind address.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Anthropic API key. Falls back to CLAUDE_API_KEY.
    #[arg(long, env = "POPMODEL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Default upstream model when no selection is persisted.
    #[arg(long, env = "POPMODEL_MODEL", default_value = "claude-3-opus-20240229")]
    model: String,

    /// Google OAuth client id; sign-in is required when set.
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,

    /// Serve without identity verification even when a client id is set.
    #[arg(long, env = "ALLOW_INSECURE_NOAUTH")]
    allow_insecure_noauth: bool,

    /// Shared code exchanged for admin tokens.
    #[arg(long, env = "ADMIN_CODE", default_value = "Pop91525", hide_env_values = true)]
    admin_code: String,

    /// Data directory. Defaults to $POPMODEL_DATA_DIR, then ~/.popmodel.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,popmodel=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let api_key = cli
        .api_key
        .or_else(|| std::env::var("CLAUDE_API_KEY").ok())
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from);

    let config = ServerConfig {
        api_key,
        default_model: cli.model,
        google_client_id: cli.google_client_id.filter(|id| !id.trim().is_empty()),
        allow_insecure_noauth: cli.allow_insecure_noauth,
        admin_code: cli.admin_code,
        data_dir: cli.data_dir.unwrap_or_else(resolve_data_dir),
    };

    let state = AppState::init(config).await?;
    let router = http::router::build_router(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "PopModel API listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
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
