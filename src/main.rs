//! Utility pricing service
//!
//! ```sh
//! # Default config (~/.config/utility-pricing/config.toml)
//! utility-pricing
//!
//! # Custom config and port
//! utility-pricing --config /etc/utility-pricing/config.toml --port 9000
//!
//! # Validate config without starting
//! utility-pricing --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use utility_pricing::config::AppConfig;
use utility_pricing::server::{init_tracing, run};

/// REST service for utility pricing tiers and service requests.
#[derive(Parser, Debug)]
#[command(
    name = "utility-pricing",
    version,
    about = "Pricing tier administration and consistency checks for utility billing"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "UTILITY_PRICING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(utility_pricing::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration in {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("  Config file : {}", config_path.display());
        println!("  Address     : {}", config.server.address());
        println!("  Services    : {}", config.pricing.service_codes.join(", "));
        println!("  Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
