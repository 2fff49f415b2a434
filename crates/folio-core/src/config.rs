//! Configuration loading and typed config structures for Folio.
//!
//! The canonical configuration lives in `folio.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure, a loader that
//! reads and validates the file, and environment overrides for the values
//! deployments usually inject.

use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_types::ImageMode;
use serde::Deserialize;

use crate::selector::FallbackPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `folio.yaml`. Every section has defaults, so
/// an empty file yields a runnable fixture-only server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FolioConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Primary relational store.
    #[serde(default)]
    pub database: DatabaseSection,

    /// Object store locations.
    #[serde(default)]
    pub storage: StorageSection,

    /// Image resolution policy.
    #[serde(default)]
    pub images: ImagesSection,

    /// Behavior when the primary store is unavailable.
    #[serde(default)]
    pub fallback: FallbackSection,

    /// Transcript assembly.
    #[serde(default)]
    pub text: TextSection,

    /// Catalog-wide labels.
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Directory holding the built frontend bundle.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl FolioConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override file values:
    /// - `DATABASE_URL` overrides `database.url`
    /// - `FOLIO_HOST` / `FOLIO_PORT` override `server.host` / `server.port`
    /// - `FOLIO_PUBLIC_BASE_URL` overrides `images.public_base_url`
    /// - `FOLIO_STATIC_DIR` overrides `static_dir`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// process environment or validating.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with process environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `FOLIO_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override values using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `FOLIO_PORT` is not a port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("DATABASE_URL") {
            self.database.url = Some(val);
        }
        if let Some(val) = lookup("FOLIO_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("FOLIO_PORT") {
            self.server.port = val
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("FOLIO_PORT={val}: {e}")))?;
        }
        if let Some(val) = lookup("FOLIO_PUBLIC_BASE_URL") {
            self.images.public_base_url = Some(val);
        }
        if let Some(val) = lookup("FOLIO_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(val));
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.mode == ImageMode::PublicUrl
            && self
                .images
                .public_base_url
                .as_deref()
                .is_none_or(|base| base.trim().is_empty())
        {
            return Err(ConfigError::Invalid(String::from(
                "images.mode public_url requires images.public_base_url",
            )));
        }
        validate_image_route(&self.images.route)?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(String::from(
                "database.max_connections must be at least 1",
            )));
        }
        Ok(())
    }

    /// The fallback policy selected by `fallback.enabled`.
    pub const fn fallback_policy(&self) -> FallbackPolicy {
        if self.fallback.enabled {
            FallbackPolicy::Fixtures
        } else {
            FallbackPolicy::Fail
        }
    }
}

/// Check that `route` can prefix the image proxy without taking over
/// other paths or producing an invalid router pattern.
fn validate_image_route(route: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| {
        Err(ConfigError::Invalid(format!("images.route {reason}: {route}")))
    };
    if !route.starts_with('/') {
        return invalid("must start with '/'");
    }
    if route.trim_end_matches('/').is_empty() {
        return invalid("must not be the root path");
    }
    if route.contains(['{', '}']) {
        return invalid("must not contain braces");
    }
    if route
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return invalid("must not contain capture segments");
    }
    Ok(())
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Primary relational store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseSection {
    /// `PostgreSQL` connection URL. `None` means no primary store.
    #[serde(default)]
    pub url: Option<String>,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Milliseconds to wait when acquiring a connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Run embedded migrations on startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseSection {
    /// Connection acquire timeout as a [`Duration`].
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
            run_migrations: false,
        }
    }
}

/// Object store locations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSection {
    /// Directory backing the page-image store.
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Directory backing the text-fragment store.
    #[serde(default = "default_texts_dir")]
    pub texts_dir: PathBuf,

    /// YAML file with fallback fixtures. Built-in fixtures when unset.
    #[serde(default)]
    pub fixtures_path: Option<PathBuf>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            images_dir: default_images_dir(),
            texts_dir: default_texts_dir(),
            fixtures_path: None,
        }
    }
}

/// Image resolution policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImagesSection {
    /// How image URLs are produced.
    #[serde(default)]
    pub mode: ImageMode,

    /// Route prefix of the local image proxy.
    #[serde(default = "default_image_route")]
    pub route: String,

    /// Public base URL used by [`ImageMode::PublicUrl`].
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Attach `thumbnail_url` to listing entries.
    #[serde(default)]
    pub thumbnails: bool,
}

impl Default for ImagesSection {
    fn default() -> Self {
        Self {
            mode: ImageMode::default(),
            route: default_image_route(),
            public_base_url: None,
            thumbnails: false,
        }
    }
}

/// Behavior when the primary store is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FallbackSection {
    /// Serve fixtures instead of failing the request.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for FallbackSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Transcript assembly settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextSection {
    /// Per-fragment fetch timeout in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl TextSection {
    /// Per-fragment fetch timeout as a [`Duration`].
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for TextSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

/// Catalog-wide labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogSection {
    /// Author label attached to every column.
    #[serde(default = "default_author")]
    pub author: String,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            author: default_author(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8787
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("data/page-images")
}

fn default_texts_dir() -> PathBuf {
    PathBuf::from("data/page-texts")
}

fn default_image_route() -> String {
    "/images".to_owned()
}

const fn default_fetch_timeout_ms() -> u64 {
    3_000
}

fn default_author() -> String {
    folio_types::AUTHOR_LABEL.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
