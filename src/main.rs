use anyhow::{Context, Result};
use clap::Parser;
use gemini_relay::app::App;
use gemini_relay::models::Config;
use std::net::IpAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "gemini-relay")]
#[command(about = "Relay prompts and media uploads to Gemini over HTTP")]
struct CliArgs {
    /// Port to listen on. Overrides the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let port = args.port.unwrap_or(config.port);
    let listener = TcpListener::bind((args.host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", args.host, port))?;

    info!("Starting gemini-relay");
    App::from_config(&config).serve(listener).await?;
    Ok(())
}
