//! HTTP API server for the Folio column catalog.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Catalog endpoints** (`/api/columns`, `/api/columns/{id}`) served
//!   from `PostgreSQL` or, when it is unavailable, from fixtures
//! - **Image proxy** (`/images/{*key}`) with entity tags and immutable
//!   cache headers
//! - **Health** (`/api/health`)
//! - **Static bundle** for the single-page frontend, with `index.html`
//!   fallback for client-side routes
//!
//! # Architecture
//!
//! Availability of the primary store is decided once at startup (a pool
//! exists or it does not) and attached to each request by middleware as
//! a [`DataSourceMode`](folio_types::DataSourceMode). Handlers pass both
//! backend paths to the selector and project whatever records come back.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, build_state};
pub use state::AppState;
