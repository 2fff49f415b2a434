//! Enumeration types shared by the backends and the HTTP layer.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// The record field a listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    /// The column title.
    Title,
    /// The calendar publish date.
    PublishDate,
}

impl SortField {
    /// The SQL sort expression this field maps to in `columns_meta_data`.
    ///
    /// Only ever one of these fixed expressions reaches a query, so the
    /// `ORDER BY` clause can be assembled without binding user text.
    /// Titles sort under the `"C"` collation, which is byte order, so the
    /// database and the fixture catalog agree on mixed-case titles.
    pub const fn sql_sort_expr(self) -> &'static str {
        match self {
            Self::Title => r#"column_title COLLATE "C""#,
            Self::PublishDate => "publish_date",
        }
    }
}

/// Ascending or descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The SQL keyword for this direction.
    pub const fn sql_keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// The closed set of listing sort keys accepted by `GET /api/columns?sort=`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SortKey {
    /// Title, A to Z.
    TitleAsc,
    /// Title, Z to A.
    TitleDesc,
    /// Publish date, earliest first.
    #[default]
    PublishDateAsc,
    /// Publish date, latest first.
    PublishDateDesc,
}

impl SortKey {
    /// All sort keys, in the order the frontend offers them.
    pub const ALL: [Self; 4] = [
        Self::TitleAsc,
        Self::TitleDesc,
        Self::PublishDateAsc,
        Self::PublishDateDesc,
    ];

    /// Resolve an optional query-string value.
    ///
    /// Absent, empty, and unrecognized values all fall back to
    /// [`SortKey::PublishDateAsc`].
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// The wire name of this key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
            Self::PublishDateAsc => "publish_date_asc",
            Self::PublishDateDesc => "publish_date_desc",
        }
    }

    /// The field this key orders by.
    pub const fn field(self) -> SortField {
        match self {
            Self::TitleAsc | Self::TitleDesc => SortField::Title,
            Self::PublishDateAsc | Self::PublishDateDesc => SortField::PublishDate,
        }
    }

    /// The direction this key orders in.
    pub const fn direction(self) -> SortDirection {
        match self {
            Self::TitleAsc | Self::PublishDateAsc => SortDirection::Asc,
            Self::TitleDesc | Self::PublishDateDesc => SortDirection::Desc,
        }
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("sort key", s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Image resolution
// ---------------------------------------------------------------------------

/// How page images are exposed to the client.
///
/// Chosen once at configuration time; every handler resolves images the
/// same way for the lifetime of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMode {
    /// A path under the local image proxy route, e.g. `/images/cover.png`.
    #[default]
    ProxiedPath,
    /// An absolute URL under a configured public base.
    PublicUrl,
    /// The proxy path plus the image bytes inlined as a base64 data URL.
    InlineBase64,
}

impl ImageMode {
    /// The configuration name of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProxiedPath => "proxied_path",
            Self::PublicUrl => "public_url",
            Self::InlineBase64 => "inline_base64",
        }
    }
}

impl FromStr for ImageMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "proxied_path" => Ok(Self::ProxiedPath),
            "public_url" => Ok(Self::PublicUrl),
            "inline_base64" => Ok(Self::InlineBase64),
            _ => Err(ParseEnumError::new("image mode", s)),
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Which backend produced a response; reported to the client as `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DataSource {
    /// The primary relational store.
    Database,
    /// The static fallback fixtures.
    Mock,
}

impl DataSource {
    /// The wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the primary store as seen by `GET /api/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DatabaseHealth {
    /// A pool exists and answered a round trip.
    Connected,
    /// A pool exists but the round trip failed.
    Unreachable,
    /// No pool was established at startup.
    NotConfigured,
}

impl DatabaseHealth {
    /// The wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Unreachable => "unreachable",
            Self::NotConfigured => "not_configured",
        }
    }
}

impl fmt::Display for DatabaseHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the primary store is reachable for the current request.
///
/// Computed once per request before any handler runs and threaded into
/// handlers as a value; never stored in shared mutable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceMode {
    /// The primary store can serve this request.
    Available,
    /// The primary store is not reachable.
    Unavailable,
}

impl DataSourceMode {
    /// Build the mode from a plain availability flag.
    pub const fn from_available(available: bool) -> Self {
        if available {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    /// Whether the primary store is reachable.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_wire_names_round_trip() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn unknown_or_missing_sort_falls_back_to_publish_date_asc() {
        assert_eq!(SortKey::from_query(None), SortKey::PublishDateAsc);
        assert_eq!(SortKey::from_query(Some("")), SortKey::PublishDateAsc);
        assert_eq!(SortKey::from_query(Some("rating_desc")), SortKey::PublishDateAsc);
        assert_eq!(SortKey::from_query(Some("TITLE_ASC")), SortKey::PublishDateAsc);
        assert_eq!(SortKey::from_query(Some("title_desc")), SortKey::TitleDesc);
    }

    #[test]
    fn sort_key_maps_to_field_and_direction() {
        assert_eq!(SortKey::TitleAsc.field(), SortField::Title);
        assert_eq!(SortKey::TitleDesc.direction(), SortDirection::Desc);
        assert_eq!(SortKey::PublishDateDesc.field().sql_sort_expr(), "publish_date");
        assert_eq!(SortKey::TitleAsc.field().sql_sort_expr(), r#"column_title COLLATE "C""#);
        assert_eq!(SortKey::PublishDateAsc.direction().sql_keyword(), "ASC");
    }

    #[test]
    fn image_mode_accepts_dash_and_underscore() {
        assert_eq!("proxied-path".parse::<ImageMode>().unwrap(), ImageMode::ProxiedPath);
        assert_eq!("public_url".parse::<ImageMode>().unwrap(), ImageMode::PublicUrl);
        assert_eq!(" Inline-Base64 ".parse::<ImageMode>().unwrap(), ImageMode::InlineBase64);
        assert!("s3".parse::<ImageMode>().is_err());
    }

    #[test]
    fn data_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DataSource::Database).unwrap(), "\"database\"");
        assert_eq!(serde_json::to_string(&DataSource::Mock).unwrap(), "\"mock\"");
        assert_eq!(
            serde_json::to_string(&DatabaseHealth::NotConfigured).unwrap(),
            format!("\"{}\"", DatabaseHealth::NotConfigured)
        );
    }

    #[test]
    fn data_source_mode_from_flag() {
        assert!(DataSourceMode::from_available(true).is_available());
        assert!(!DataSourceMode::from_available(false).is_available());
    }
}
