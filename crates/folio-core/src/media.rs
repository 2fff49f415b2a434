//! Image URL resolution, thumbnail keys, and date display.

use chrono::NaiveDate;
use folio_types::ImageMode;

use crate::config::ImagesSection;

/// Suffix inserted before the extension of a thumbnail key.
pub const THUMBNAIL_SUFFIX: &str = "_thumbnail";

/// Turns storage keys into client-facing image URLs.
///
/// The three [`ImageMode`]s are mutually exclusive; the resolver is built
/// once from configuration and shared by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    mode: ImageMode,
    route: String,
    public_base: Option<String>,
}

impl ImageResolver {
    /// Resolver producing paths under the local proxy route.
    pub fn proxied(route: &str) -> Self {
        Self {
            mode: ImageMode::ProxiedPath,
            route: route.to_owned(),
            public_base: None,
        }
    }

    /// Resolver producing absolute URLs under `base`.
    pub fn public(route: &str, base: &str) -> Self {
        Self {
            mode: ImageMode::PublicUrl,
            route: route.to_owned(),
            public_base: Some(base.to_owned()),
        }
    }

    /// Resolver producing proxy paths whose bytes are also inlined.
    pub fn inline(route: &str) -> Self {
        Self {
            mode: ImageMode::InlineBase64,
            route: route.to_owned(),
            public_base: None,
        }
    }

    /// Build the resolver described by the `images` config section.
    ///
    /// A `public_url` section without a base degrades to proxied paths;
    /// [`FolioConfig::validate`](crate::config::FolioConfig::validate)
    /// rejects that combination before it gets here.
    pub fn from_config(images: &ImagesSection) -> Self {
        match (images.mode, images.public_base_url.as_deref()) {
            (ImageMode::PublicUrl, Some(base)) => Self::public(&images.route, base),
            (ImageMode::InlineBase64, _) => Self::inline(&images.route),
            _ => Self::proxied(&images.route),
        }
    }

    /// The active resolution mode.
    pub const fn mode(&self) -> ImageMode {
        self.mode
    }

    /// Whether listing entries should carry inline image bytes.
    pub const fn inlines_images(&self) -> bool {
        matches!(self.mode, ImageMode::InlineBase64)
    }

    /// The client-facing URL for an image key.
    pub fn resolve(&self, key: &str) -> String {
        match (&self.mode, &self.public_base) {
            (ImageMode::PublicUrl, Some(base)) => join_url(base, key),
            _ => join_url(&self.route, key),
        }
    }

    /// The client-facing URL for the thumbnail of an image key.
    pub fn resolve_thumbnail(&self, key: &str) -> String {
        self.resolve(&thumbnail_key(key))
    }
}

/// Join a base and a key with exactly one `/` between them.
pub fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Derive the thumbnail key for an image key.
///
/// `name.ext` becomes `name_thumbnail.ext`; only the last `.` of the final
/// path segment separates the extension. Names without an extension
/// (including dot-files such as `.cover`) get the suffix appended with no
/// trailing dot.
pub fn thumbnail_key(key: &str) -> String {
    let (dir, file) = key
        .rsplit_once('/')
        .map_or(("", key), |(dir, file)| (dir, file));

    let thumb = match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{THUMBNAIL_SUFFIX}.{ext}"),
        _ => format!("{file}{THUMBNAIL_SUFFIX}"),
    };

    if dir.is_empty() && !key.starts_with('/') {
        thumb
    } else {
        format!("{dir}/{thumb}")
    }
}

/// Format a publish date as `Month D, YYYY`, e.g. `March 5, 2004`.
pub fn format_publish_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
