//! Per-request data-source availability.
//!
//! [`data_source_mode`] runs before every handler and attaches a
//! [`DataSourceMode`] to the request as an extension. Handlers read it
//! with `Extension<DataSourceMode>`; no handler inspects the pool to
//! decide for itself.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use folio_types::DataSourceMode;

use crate::state::AppState;

/// Compute availability for this request and attach it as an extension.
pub async fn data_source_mode(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mode = state.data_source_mode();
    tracing::debug!(
        path = %request.uri().path(),
        available = mode.is_available(),
        "data source mode"
    );
    request.extensions_mut().insert(mode);
    next.run(request).await
}
