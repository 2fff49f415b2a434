//! Data-source selection and response shaping for the Folio column catalog.
//!
//! This crate owns everything between "a request arrived" and "a JSON
//! body is ready", minus HTTP and SQL:
//!
//! ```text
//! handler
//!   |
//!   +-- select_data_source(mode, policy, primary, fallback)
//!   |       |-- primary  --> relational rows  (folio-db)
//!   |       +-- fallback --> FixtureCatalog   (fixtures)
//!   |
//!   +-- Projector  --> ColumnListResponse / ColumnDetail
//!           |-- ImageResolver   (media)
//!           +-- ObjectStore     (storage: images, text fragments)
//! ```
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`fixtures`] -- Static fallback catalog and its text fragments
//! - [`media`] -- Image URL resolution, thumbnail keys, date display
//! - [`projector`] -- Raw records to client-facing JSON shapes
//! - [`selector`] -- Primary / fallback dispatch
//! - [`storage`] -- Key-addressed object stores (filesystem, memory)

pub mod config;
pub mod fixtures;
pub mod media;
pub mod projector;
pub mod selector;
pub mod storage;

pub use config::{ConfigError, FolioConfig};
pub use fixtures::{FixtureCatalog, FixtureColumn};
pub use media::{ImageResolver, format_publish_date, thumbnail_key};
pub use projector::{ColumnNotFound, Projector};
pub use selector::{BackendUnavailable, FallbackPolicy, select_data_source};
pub use storage::{FsObjectStore, MemoryObjectStore, ObjectStore, StorageError, StoredObject};
