//! # Bazaar Server
//!
//! Entry point for the Bazaar marketplace backend.

use bazaar_config::ConfigLoader;
use bazaar_core::{telemetry::shutdown_telemetry, BazaarResult};
use bazaar_server::{app::AppBuilder, startup};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("Application error: {e}");
        shutdown_telemetry();
        std::process::exit(1);
    }
    shutdown_telemetry();
}

async fn run() -> BazaarResult<()> {
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    startup::init_logging(&config.observability);
    startup::print_banner();

    info!("Starting Bazaar server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.environment);

    AppBuilder::new().with_config(config).run().await
}
