//! Startup logging and subscriber setup.

use bazaar_config::ObservabilityConfig;
use bazaar_core::telemetry::{init_telemetry, DEFAULT_LOG_FILTER};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// With span export enabled the OTLP subscriber from `bazaar_core` is used.
/// Otherwise a `fmt` subscriber is installed, emitting JSON lines when
/// `observability.log_format = "json"`. `RUST_LOG` overrides the configured
/// filter.
pub fn init_logging(config: &ObservabilityConfig) {
    match init_telemetry(&config.telemetry) {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => eprintln!("Span export disabled: {e}"),
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if let Err(e) = result {
        warn!("Tracing subscriber already installed: {}", e);
    }
}

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
    ____
   / __ )____ _____  ____ _____ ______
  / __  / __ `/_  / / __ `/ __ `/ ___/
 / /_/ / /_/ / / /_/ /_/ / /_/ / /
/_____/\__,_/ /___/\__,_/\__,_/_/
    "#);
}

/// Prints where the server can be reached.
pub fn print_startup_info(addr: &str) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1", addr);
    info!("Health:    http://{}/health", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}
