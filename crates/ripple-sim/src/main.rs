//! # Ripple Simulator
//!
//! Runs a fan-out scenario against a Ripple group and reports how many
//! messages were delivered, dropped and how long publishing took.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default settings
//! ripple
//!
//! # Run with a config file
//! RIPPLE_CONFIG=/path/to/ripple.toml ripple
//!
//! # Run with environment variables
//! RIPPLE_MEMBERS=1024 RIPPLE_TIMEOUT_MS=50 ripple
//! ```

mod config;
mod sim;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::load()?;
    config.validate()?;

    // Initialize metrics
    let prometheus = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        ripple_core::metrics::describe();
        Some(handle)
    } else {
        None
    };

    let report = sim::run(&config).await?;
    report.log();

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    Ok(())
}
