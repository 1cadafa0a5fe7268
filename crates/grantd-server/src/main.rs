use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use grantd_server::ServerConfig;

/// OAuth 2.0 authorization server.
#[derive(Debug, Parser)]
#[command(name = "grantd", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "grantd.toml", env = "GRANTD_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::load(&cli.config)?;
    tracing::info!(path = %cli.config.display(), "configuration loaded");

    let state = grantd_server::build_state(&config)?;
    let app = grantd_server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    tracing::info!(listen = %config.listen, "grantd listening");
    axum::serve(listener, app).await?;

    Ok(())
}
