use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use fleetlord::adapter::{FleetBackend, InMemoryRegistry};
use fleetlord::config::Config;
use fleetlord::service::{Orchestrator, ProbeClient};

/// Object server fleet reconciler
#[derive(Parser, Debug)]
#[command(name = "fleetlord")]
#[command(version)]
struct Cli {
    /// Path to the fleet configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.logging.init();
    info!(fleet = config.fleet.len(), "fleetlord starting");

    let probe = match ProbeClient::new(Duration::from_secs(config.orchestrator.probe_timeout_secs))
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to build probe client");
            std::process::exit(1);
        }
    };

    let registry = Arc::new(InMemoryRegistry::from_servers(config.fleet.clone()));
    let backend = Arc::new(FleetBackend::from_config(&config));
    let orchestrator = Orchestrator::new(registry, backend, probe, config.orchestrator.clone());

    tokio::select! {
        result = orchestrator.run() => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("fleetlord stopped");
}
