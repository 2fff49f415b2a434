//! REST endpoint handlers for the catalog API.
//!
//! Catalog handlers describe their primary and fallback paths as two
//! closures and let [`select_data_source`] pick one, then hand the raw
//! records to the [`Projector`](folio_core::Projector).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/columns` | List columns (`genre`, `sort`) |
//! | `GET` | `/api/columns/{id}` | Single column with pages and transcript |
//! | `GET` | `/images/{*key}` | Image proxy with entity tags |
//! | `GET` | `/api/health` | Liveness and active data source |

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use folio_core::{BackendUnavailable, ObjectStore, select_data_source};
use folio_db::PostgresPool;
use folio_types::{
    ColumnDetail, ColumnListResponse, DataSource, DataSourceMode, DatabaseHealth, HealthResponse,
    SortKey,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Cache directive for proxied images. Keys are immutable once published.
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/columns` endpoint.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ColumnsQuery {
    /// Restrict the listing to one genre. Empty means no filter.
    pub genre: Option<String>,
    /// Sort key; unknown or absent values fall back to `publish_date_asc`.
    pub sort: Option<String>,
}

impl ColumnsQuery {
    /// The genre filter, with an empty value treated as absent.
    pub fn genre(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
    }

    /// The parsed sort key.
    pub fn sort_key(&self) -> SortKey {
        SortKey::from_query(self.sort.as_deref())
    }
}

fn primary(state: &AppState) -> Result<&PostgresPool, BackendUnavailable> {
    state.database.as_ref().ok_or(BackendUnavailable)
}

// ---------------------------------------------------------------------------
// GET /api/columns
// ---------------------------------------------------------------------------

/// List columns, sorted and optionally filtered by genre.
pub async fn list_columns(
    State(state): State<Arc<AppState>>,
    Extension(mode): Extension<DataSourceMode>,
    Query(query): Query<ColumnsQuery>,
) -> Result<Json<ColumnListResponse>, ApiError> {
    let state: &AppState = &state;
    let sort = query.sort_key();
    let genre = query.genre();

    let (records, source) = select_data_source(
        mode,
        state.fallback,
        move || async move {
            let records = primary(state)?.catalog().list_columns(sort, genre).await?;
            Ok::<_, ApiError>((records, DataSource::Database))
        },
        move || async move { Ok((state.fixtures.list_columns(sort, genre), DataSource::Mock)) },
    )
    .await?;

    tracing::debug!(%sort, genre, %source, count = records.len(), "listing columns");

    let response = state
        .projector
        .project_listing(&records, state.images.as_ref(), source)
        .await;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// GET /api/columns/{id}
// ---------------------------------------------------------------------------

/// Get a single column with its page images and assembled transcript.
pub async fn get_column(
    State(state): State<Arc<AppState>>,
    Extension(mode): Extension<DataSourceMode>,
    Path(id): Path<String>,
) -> Result<Json<ColumnDetail>, ApiError> {
    let state: &AppState = &state;
    let id: &str = &id;

    let (rows, source) = select_data_source(
        mode,
        state.fallback,
        move || async move {
            let rows = primary(state)?.catalog().column_pages(id).await?;
            Ok::<_, ApiError>((rows, DataSource::Database))
        },
        move || async move { Ok((state.fixtures.column_pages(id), DataSource::Mock)) },
    )
    .await?;

    let texts: &dyn ObjectStore = match source {
        DataSource::Database => state.texts.as_ref(),
        DataSource::Mock => state.fixture_texts.as_ref(),
    };

    let detail = state.projector.project_detail(&rows, texts, source).await?;
    tracing::debug!(column_id = id, %source, pages = detail.image_urls.len(), "column detail");
    Ok(Json(detail))
}

// ---------------------------------------------------------------------------
// GET /images/{*key}
// ---------------------------------------------------------------------------

/// Serve an image from the image store verbatim.
///
/// Sets the stored content type (default `application/octet-stream`), an
/// entity tag, and a one-year immutable cache directive. A matching
/// `If-None-Match` yields `304 Not Modified` with no body.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let object = state
        .images
        .get(&key)
        .await?
        .ok_or(ApiError::ImageNotFound)?;

    let etag = object.etag().to_owned();
    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|value| etag_matches(value, &etag));

    if not_modified {
        return Ok((
            StatusCode::NOT_MODIFIED,
            [
                (header::ETAG, etag),
                (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_owned()),
            ],
        )
            .into_response());
    }

    let content_type = HeaderValue::from_str(object.content_type_or_default())
        .unwrap_or_else(|_| HeaderValue::from_static(folio_core::storage::DEFAULT_CONTENT_TYPE));

    let mut response = Response::new(Body::from(object.into_bytes()));
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, content_type);
    if let Ok(value) = HeaderValue::from_str(&etag) {
        response_headers.insert(header::ETAG, value);
    }
    response_headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(IMAGE_CACHE_CONTROL),
    );
    Ok(response)
}

/// Whether an `If-None-Match` header value matches `etag`.
///
/// Accepts `*`, comma-separated lists, and weak validators.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Report liveness, the serving backend, and a primary store round trip.
///
/// A failed round trip is reported in the body, never as an error status.
pub async fn health(
    State(state): State<Arc<AppState>>,
    Extension(mode): Extension<DataSourceMode>,
) -> Json<HealthResponse> {
    let database = match &state.database {
        None => DatabaseHealth::NotConfigured,
        Some(pool) => match pool.ping().await {
            Ok(()) => DatabaseHealth::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "database ping failed");
                DatabaseHealth::Unreachable
            }
        },
    };
    Json(HealthResponse::ok(
        env!("CARGO_PKG_VERSION"),
        AppState::source_for(mode),
        database,
    ))
}

// ---------------------------------------------------------------------------
// Fallback for unmatched routes
// ---------------------------------------------------------------------------

/// JSON 404 for paths no route or static bundle answers.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(folio_types::ErrorBody::new("Not found")),
    )
}
