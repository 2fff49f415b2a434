//! Axum router construction for the catalog API.
//!
//! Assembles the API routes, the image proxy, and the static bundle into
//! a single [`Router`]. Every request passes through the data-source
//! middleware first; CORS is permissive so the frontend dev server can
//! call the API from another origin.

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::data_source_mode;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/columns` -- column listing
/// - `GET /api/columns/{id}` -- column detail
/// - `GET /api/health` -- liveness and data source
/// - `GET {image_route}/{*key}` -- image proxy (default `/images`)
/// - everything else -- the frontend bundle from `static_dir`, with
///   unknown paths answered by its `index.html`; a JSON 404 when no
///   bundle is configured
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let image_path = format!("{}/{{*key}}", state.image_route);

    let router = Router::new()
        .route("/api/columns", get(handlers::list_columns))
        .route("/api/columns/{id}", get(handlers::get_column))
        .route("/api/health", get(handlers::health))
        .route(&image_path, get(handlers::get_image));

    let router = match &state.static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router.fallback(handlers::not_found),
    };

    router
        .layer(from_fn_with_state(Arc::clone(&state), data_source_mode))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
