//! WebFinger Server Entry Point
//!
//! This is the main entry point for the lookup server. It initializes
//! logging, loads configuration, builds the configured driver and serves
//! lookups over HTTP until interrupted.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use fingerpost::core::{Config, HttpTransport, LookupServer};
use fingerpost::domains::drivers::build_driver;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Build the driver selected in the settings file
    let settings = config.load_driver_settings().with_context(|| {
        format!(
            "loading driver settings from {}",
            config.source.config_file.display()
        )
    })?;
    let driver = build_driver(&settings)
        .await
        .with_context(|| format!("building `{}` driver", settings.driver))?;

    info!("Using driver `{}`", driver.name());

    // Create the lookup server and run the transport
    let transport = HttpTransport::new(config.transport.clone());
    let server = LookupServer::new(config, driver);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
