//! Startup wiring from configuration to [`AppState`].
//!
//! [`build_state`] connects the primary store when a URL is configured,
//! runs migrations if asked, loads the fixture catalog, and assembles the
//! shared state. A primary store that cannot be reached is not fatal:
//! the server starts without it and every request sees the store as
//! unavailable, which the fallback policy then answers.

use folio_core::{ConfigError, FixtureCatalog, FolioConfig};
use folio_db::{DbError, PostgresConfig, PostgresPool};
use tracing::{info, warn};

use crate::state::AppState;

/// Errors that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The fixture file could not be loaded.
    #[error("fixtures error: {0}")]
    Fixtures(#[from] ConfigError),

    /// Migrations failed against a reachable database.
    #[error("migration error: {0}")]
    Migration(#[from] DbError),
}

/// Connect to the primary store, if one is configured.
///
/// Returns `None` when no URL is configured or the connection fails.
pub async fn connect_database(config: &FolioConfig) -> Option<PostgresPool> {
    let Some(url) = config.database.url.as_deref() else {
        info!("no database configured, primary store unavailable");
        return None;
    };

    let pg_config = PostgresConfig::new(url)
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(config.database.connect_timeout());

    match PostgresPool::connect(&pg_config).await {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(
                error = %e,
                fallback = config.fallback.enabled,
                "database unreachable, primary store unavailable"
            );
            None
        }
    }
}

/// Load the fixture catalog from `storage.fixtures_path`, or the
/// built-in set when no path is configured.
///
/// # Errors
///
/// Returns [`ConfigError`] if the configured file cannot be read or parsed.
pub fn load_fixtures(config: &FolioConfig) -> Result<FixtureCatalog, ConfigError> {
    match &config.storage.fixtures_path {
        Some(path) => {
            let fixtures = FixtureCatalog::from_file(path)?;
            info!(
                path = %path.display(),
                columns = fixtures.columns.len(),
                "fixtures loaded"
            );
            Ok(fixtures)
        }
        None => Ok(FixtureCatalog::builtin()),
    }
}

/// Assemble the shared state for `config`.
///
/// # Errors
///
/// Returns [`StartupError`] if fixtures cannot be loaded or migrations
/// fail against a connected database.
pub async fn build_state(config: &FolioConfig) -> Result<AppState, StartupError> {
    let fixtures = load_fixtures(config)?;
    let database = connect_database(config).await;

    if let Some(pool) = &database
        && config.database.run_migrations
    {
        pool.run_migrations().await?;
    }

    let state = AppState::from_config(config, database, fixtures);
    info!(
        primary = state.database.is_some(),
        fallback = ?state.fallback,
        image_mode = %config.images.mode,
        static_dir = ?state.static_dir,
        "application state ready"
    );
    Ok(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use folio_types::DataSourceMode;

    use super::*;

    #[tokio::test]
    async fn no_database_url_means_unavailable() {
        let config = FolioConfig::parse_without_env("").unwrap();
        let state = build_state(&config).await.unwrap();
        assert_eq!(state.data_source_mode(), DataSourceMode::Unavailable);
        assert!(!state.fixtures.columns.is_empty());
    }

    #[tokio::test]
    async fn malformed_database_url_is_not_fatal() {
        let config = FolioConfig::parse_without_env("database:\n  url: \"not a url\"\n").unwrap();
        assert!(connect_database(&config).await.is_none());
    }

    #[test]
    fn fixtures_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.yaml");
        std::fs::write(
            &path,
            "columns:\n  - id: only\n    title: Only One\n    publish_date: 2001-02-03\n    pages: [only.png]\n",
        )
        .unwrap();

        let mut config = FolioConfig::default();
        config.storage.fixtures_path = Some(path);
        let fixtures = load_fixtures(&config).unwrap();
        assert_eq!(fixtures.columns.len(), 1);
    }

    #[test]
    fn missing_fixtures_file_is_an_error() {
        let mut config = FolioConfig::default();
        config.storage.fixtures_path = Some(std::path::PathBuf::from("/nonexistent/fixtures.yaml"));
        assert!(matches!(load_fixtures(&config), Err(ConfigError::Io { .. })));
    }
}
