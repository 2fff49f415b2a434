//! Shared application state for the catalog API.
//!
//! [`AppState`] is built once at startup and shared read-only across
//! requests. It holds the optional primary store, the fallback fixtures,
//! the object stores for images and text fragments, and the projector.
//! Nothing in it is mutated while serving.

use std::path::PathBuf;
use std::sync::Arc;

use folio_core::{
    FallbackPolicy, FixtureCatalog, FolioConfig, FsObjectStore, ImageResolver, MemoryObjectStore,
    ObjectStore, Projector,
};
use folio_db::PostgresPool;
use folio_types::{AUTHOR_LABEL, DataSource, DataSourceMode};

/// Default mount point of the image proxy.
const DEFAULT_IMAGE_ROUTE: &str = "/images";

/// State shared by every handler.
pub struct AppState {
    /// Primary store; `None` when no connection was established.
    pub database: Option<PostgresPool>,
    /// Fallback catalog.
    pub fixtures: FixtureCatalog,
    /// Page images, served by the proxy and inlined in inline mode.
    pub images: Arc<dyn ObjectStore>,
    /// Text fragments referenced by the primary store.
    pub texts: Arc<dyn ObjectStore>,
    /// Text fragments of the fixture catalog.
    pub fixture_texts: Arc<dyn ObjectStore>,
    /// Record-to-response transform.
    pub projector: Projector,
    /// What to do when the primary store is unavailable.
    pub fallback: FallbackPolicy,
    /// Mount point of the image proxy.
    pub image_route: String,
    /// Built frontend bundle, if any.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Fixture-only state with the built-in catalog, empty image and
    /// text stores, proxied image URLs, and fallback enabled.
    pub fn new() -> Self {
        let fixtures = FixtureCatalog::builtin();
        let fixture_texts = Arc::new(fixtures.text_store());
        Self {
            database: None,
            fixtures,
            images: Arc::new(MemoryObjectStore::new()),
            texts: Arc::new(MemoryObjectStore::new()),
            fixture_texts,
            projector: Projector::new(ImageResolver::proxied(DEFAULT_IMAGE_ROUTE), AUTHOR_LABEL),
            fallback: FallbackPolicy::Fixtures,
            image_route: String::from(DEFAULT_IMAGE_ROUTE),
            static_dir: None,
        }
    }

    /// Build state from configuration, an optional connected pool, and
    /// the fixture catalog to fall back on.
    pub fn from_config(
        config: &FolioConfig,
        database: Option<PostgresPool>,
        fixtures: FixtureCatalog,
    ) -> Self {
        let fixture_texts = Arc::new(fixtures.text_store());
        Self {
            database,
            fixtures,
            images: Arc::new(FsObjectStore::new(&config.storage.images_dir)),
            texts: Arc::new(FsObjectStore::new(&config.storage.texts_dir)),
            fixture_texts,
            projector: Projector::from_config(config),
            fallback: config.fallback_policy(),
            image_route: config.images.route.trim_end_matches('/').to_owned(),
            static_dir: config.static_dir.clone(),
        }
    }

    /// Replace the fallback catalog and its text store.
    #[must_use]
    pub fn with_fixtures(mut self, fixtures: FixtureCatalog) -> Self {
        self.fixture_texts = Arc::new(fixtures.text_store());
        self.fixtures = fixtures;
        self
    }

    /// Replace the image store.
    #[must_use]
    pub fn with_images(mut self, images: Arc<dyn ObjectStore>) -> Self {
        self.images = images;
        self
    }

    /// Replace the projector.
    #[must_use]
    pub fn with_projector(mut self, projector: Projector) -> Self {
        self.projector = projector;
        self
    }

    /// Set the fallback policy.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Serve a frontend bundle from `dir`.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Availability of the primary store for a request.
    pub const fn data_source_mode(&self) -> DataSourceMode {
        DataSourceMode::from_available(self.database.is_some())
    }

    /// The backend that serves catalog requests in `mode`.
    pub const fn source_for(mode: DataSourceMode) -> DataSource {
        if mode.is_available() {
            DataSource::Database
        } else {
            DataSource::Mock
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("database", &self.database.is_some())
            .field("fixture_columns", &self.fixtures.columns.len())
            .field("fallback", &self.fallback)
            .field("image_route", &self.image_route)
            .field("static_dir", &self.static_dir)
            .finish_non_exhaustive()
    }
}
