//! Folio server binary.
//!
//! Loads configuration, initializes logging, connects the primary store
//! (or decides to run without it), and serves the catalog API until
//! `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Resolve the config path (`--config`, `FOLIO_CONFIG`, `folio.yaml`)
//! 2. Load configuration with environment overrides
//! 3. Initialize structured logging (tracing)
//! 4. Load fixtures and connect `PostgreSQL`, running migrations if enabled
//! 5. Serve HTTP

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use folio_core::FolioConfig;
use folio_core::config::{LogFormat, LoggingSection};
use folio_server::{ServerConfig, build_state, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Config file used when neither `--config` nor `FOLIO_CONFIG` is given.
const DEFAULT_CONFIG_PATH: &str = "folio.yaml";

/// Command-line arguments for the `folio` binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Folio column catalog server")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, env = "FOLIO_CONFIG")]
    config: Option<PathBuf>,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, startup, or the server fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1-2. Load configuration.
    let cli = Cli::parse();
    let (config, config_path) = load_config(cli.config)?;

    // 3. Initialize structured logging.
    init_tracing(&config.logging);

    info!("folio starting");
    info!(
        config = %config_path.display(),
        host = config.server.host,
        port = config.server.port,
        image_mode = %config.images.mode,
        fallback = config.fallback.enabled,
        database_configured = config.database.url.is_some(),
        "Configuration loaded"
    );

    // 4. Build application state.
    let state = Arc::new(build_state(&config).await?);

    // 5. Serve.
    let server_config = ServerConfig::from(&config.server);
    start_server(&server_config, Arc::clone(&state)).await?;

    if let Some(pool) = &state.database {
        pool.close().await;
    }

    info!("folio stopped");
    Ok(())
}

/// Load the config at `explicit`, or at the default path.
///
/// A missing file at the default path yields defaults (with environment
/// overrides); a missing file that was asked for explicitly is an error.
fn load_config(explicit: Option<PathBuf>) -> Result<(FolioConfig, PathBuf), AppError> {
    match explicit {
        Some(path) => {
            let config = FolioConfig::from_file(&path)?;
            Ok((config, path))
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            let config = if Path::new(DEFAULT_CONFIG_PATH).exists() {
                FolioConfig::from_file(&path)?
            } else {
                FolioConfig::parse("")?
            };
            Ok((config, path))
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
