//! Stage Gate Server
//!
//! Runs the team verification backend as a standalone HTTP server.

use anyhow::Result;
use clap::Parser;
use stage_gate::{GateConfig, MatchStrategy};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stage-gate-server")]
#[command(about = "Two-stage team credential verification server")]
struct Args {
    /// Optional TOML config file; flags below override it
    #[arg(short, long, env = "GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Server port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Server host
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Data directory
    #[arg(short, long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Credential match strategy: direct | parity-bucket
    #[arg(long, env = "MATCH_STRATEGY")]
    match_strategy: Option<MatchStrategy>,

    /// Disable the permissive CORS layer
    #[arg(long)]
    no_cors: bool,
}

impl Args {
    fn into_config(self) -> Result<GateConfig> {
        let mut config = match &self.config {
            Some(path) => GateConfig::from_toml_file(path)?,
            None => GateConfig::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(strategy) = self.match_strategy {
            config.match_strategy = strategy;
        }
        if self.no_cors {
            config.cors = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stage_gate=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config = Args::parse().into_config()?;

    info!("Starting Stage Gate Server");
    info!("  Listening on: {}", config.bind_address());

    stage_gate::run_server(config).await
}
