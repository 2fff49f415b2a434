//! Client-facing JSON bodies.
//!
//! These mirror what the frontend reads from `GET /api/columns` and
//! `GET /api/columns/{id}`. Optional fields are omitted from the JSON
//! entirely when absent rather than serialized as `null`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DataSource, DatabaseHealth};

/// Default author label attached to every column.
pub const AUTHOR_LABEL: &str = "Frank Walsh";

/// One entry of the column listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ColumnSummary {
    /// Opaque column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the first page image.
    pub first_img_file_name: Option<String>,
    /// ISO `YYYY-MM-DD` publish date.
    pub publish_date: NaiveDate,
    /// Genre or category.
    pub genre: Option<String>,
    /// Author label.
    pub author: String,
    /// Resolved URL of the first page image.
    pub image_url: Option<String>,
    /// Publish date formatted as `Month D, YYYY`.
    pub publish_date_display: String,
    /// Resolved URL of the first page's thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub thumbnail_url: Option<String>,
    /// Inline `data:` URL of the first page image (inline mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_data: Option<String>,
}

/// Body of `GET /api/columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ColumnListResponse {
    /// Listing entries in backend order.
    pub columns: Vec<ColumnSummary>,
    /// Which backend served the listing.
    pub source: DataSource,
}

/// Body of `GET /api/columns/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ColumnDetail {
    /// Opaque column identifier.
    pub id: String,
    /// Display title.
    pub column_title: String,
    /// Storage key of the first page image.
    pub first_img_file_name: Option<String>,
    /// ISO `YYYY-MM-DD` publish date.
    pub publish_date: NaiveDate,
    /// Genre or category.
    pub genre: Option<String>,
    /// Author label.
    pub author: String,
    /// Publish date formatted as `Month D, YYYY`.
    pub publish_date_display: String,
    /// Resolved URL of the first page in page order.
    pub image_url: String,
    /// Resolved URLs of every page, in page order.
    pub image_urls: Vec<String>,
    /// Which backend served the detail.
    pub source: DataSource,
    /// Concatenated transcript of the column's text fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub text_content: Option<String>,
}

/// Error body returned by every failing API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl ErrorBody {
    /// Create an error body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Backend that would serve catalog requests right now.
    pub source: DataSource,
    /// Result of a round trip to the primary store.
    pub database: DatabaseHealth,
}

impl HealthResponse {
    /// A healthy response reporting `source` and `database`.
    pub fn ok(version: impl Into<String>, source: DataSource, database: DatabaseHealth) -> Self {
        Self {
            status: String::from("ok"),
            version: version.into(),
            source,
            database,
        }
    }
}
