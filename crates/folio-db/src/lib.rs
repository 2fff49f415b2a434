//! `PostgreSQL` data layer for the Folio column catalog.
//!
//! The relational store is the primary backend: it holds column metadata,
//! page images, and text-fragment keys. This crate is read-only relative
//! to that data; the schema is created by the embedded migrations and
//! populated out of band.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`catalog_store`] -- Listing and detail queries
//! - [`error`] -- Shared error types

pub mod catalog_store;
pub mod error;
pub mod postgres;

// Re-export primary types for convenience.
pub use catalog_store::{CatalogStore, ColumnRow, PageRow};
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
