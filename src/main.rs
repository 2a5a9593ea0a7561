use clap::Parser;
use std::path::PathBuf;
use threatflow::{Dispatcher, EngineConfig, HttpServer};
use tracing::Level;

/// Threatflow executor server
#[derive(Parser)]
#[command(name = "threatflow-server", version, about)]
struct Cli {
    /// YAML configuration file
    #[arg(long, short, env = "THREATFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    address: Option<String>,

    /// Override the port
    #[arg(long)]
    port: Option<u16>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(log_level(cli.verbose)).init();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(address) = cli.address {
        config.server.address = address;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    println!("Threatflow executor v{}", threatflow::version());

    let server_config = config.server.clone();
    let dispatcher = Dispatcher::new(config)?;
    let server = HttpServer::new(dispatcher, server_config);
    server.start().await
}
