//! Raw records to client-facing JSON shapes.
//!
//! The [`Projector`] is a stateless per-request transform. It never
//! re-sorts: listing output follows input order, and detail image URLs
//! follow row order (which the backend guarantees is page order).
//!
//! Object-store misses never fail a projection. A missing inline image
//! leaves `image_data` out; a missing text fragment is dropped from the
//! transcript.

use std::time::Duration;

use folio_types::{ColumnDetail, ColumnListResponse, ColumnRecord, ColumnSummary, DataSource, PageRecord};
use futures::future::join_all;
use futures::stream::{self, StreamExt};

use crate::config::FolioConfig;
use crate::media::{ImageResolver, format_publish_date};
use crate::storage::ObjectStore;

/// Separator placed between concatenated text fragments.
pub const TRANSCRIPT_SEPARATOR: &str = "\n\n";

/// Default per-fragment fetch timeout.
const DEFAULT_TEXT_TIMEOUT: Duration = Duration::from_secs(3);

/// Inline image reads in flight at once while projecting a listing.
pub const INLINE_IMAGE_CONCURRENCY: usize = 8;

/// The requested column has no page rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Column not found")]
pub struct ColumnNotFound;

/// Shapes raw backend records into response bodies.
#[derive(Debug, Clone)]
pub struct Projector {
    resolver: ImageResolver,
    author: String,
    thumbnails: bool,
    text_timeout: Duration,
}

impl Projector {
    /// Create a projector with the given resolver and author label.
    pub fn new(resolver: ImageResolver, author: impl Into<String>) -> Self {
        Self {
            resolver,
            author: author.into(),
            thumbnails: false,
            text_timeout: DEFAULT_TEXT_TIMEOUT,
        }
    }

    /// Build a projector from the `images`, `catalog`, and `text` sections.
    pub fn from_config(config: &FolioConfig) -> Self {
        Self::new(
            ImageResolver::from_config(&config.images),
            config.catalog.author.clone(),
        )
        .with_thumbnails(config.images.thumbnails)
        .with_text_timeout(config.text.fetch_timeout())
    }

    /// Attach `thumbnail_url` to listing entries.
    #[must_use]
    pub const fn with_thumbnails(mut self, enabled: bool) -> Self {
        self.thumbnails = enabled;
        self
    }

    /// Set the per-fragment text fetch timeout.
    #[must_use]
    pub const fn with_text_timeout(mut self, timeout: Duration) -> Self {
        self.text_timeout = timeout;
        self
    }

    /// Project one listing record without touching any store.
    pub fn summarize(&self, record: &ColumnRecord) -> ColumnSummary {
        let first = record.first_img_file_name.as_deref();
        ColumnSummary {
            id: record.id.clone(),
            column_title: record.column_title.clone(),
            first_img_file_name: record.first_img_file_name.clone(),
            publish_date: record.publish_date,
            genre: record.genre.clone(),
            author: self.author.clone(),
            image_url: first.map(|key| self.resolver.resolve(key)),
            publish_date_display: format_publish_date(record.publish_date),
            thumbnail_url: first
                .filter(|_| self.thumbnails)
                .map(|key| self.resolver.resolve_thumbnail(key)),
            image_data: None,
        }
    }

    /// Project a listing, in input order.
    ///
    /// In inline mode the first page of every entry is fetched from
    /// `images` and attached as a `data:` URL. At most
    /// [`INLINE_IMAGE_CONCURRENCY`] reads run at once, each bounded by the
    /// fetch timeout; a slow image is left out like a missing one.
    pub async fn project_listing(
        &self,
        records: &[ColumnRecord],
        images: &dyn ObjectStore,
        source: DataSource,
    ) -> ColumnListResponse {
        let mut columns: Vec<ColumnSummary> = records.iter().map(|r| self.summarize(r)).collect();

        if self.resolver.inlines_images() {
            let timeout = self.text_timeout;
            let keys: Vec<Option<String>> = records
                .iter()
                .map(|record| record.first_img_file_name.clone())
                .collect();
            let payloads: Vec<Option<String>> = stream::iter(keys)
                .map(|key| async move {
                    match key {
                        Some(key) => inline_image(images, &key, timeout).await,
                        None => None,
                    }
                })
                .buffered(INLINE_IMAGE_CONCURRENCY)
                .collect()
                .await;
            for (summary, payload) in columns.iter_mut().zip(payloads) {
                summary.image_data = payload;
            }
        }

        ColumnListResponse { columns, source }
    }

    /// Project the detail view of a single column.
    ///
    /// The first row supplies the column-level metadata. Page images are
    /// deduplicated by key in first-seen order, since the text-fragment
    /// left join repeats each page once per fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnNotFound`] if `rows` is empty.
    pub async fn project_detail(
        &self,
        rows: &[PageRecord],
        texts: &dyn ObjectStore,
        source: DataSource,
    ) -> Result<ColumnDetail, ColumnNotFound> {
        let first = rows.first().ok_or(ColumnNotFound)?;

        let image_urls: Vec<String> =
            dedup_preserving_order(rows.iter().map(|r| r.page_img_file_name.as_str()))
                .into_iter()
                .map(|key| self.resolver.resolve(key))
                .collect();
        let image_url = image_urls
            .first()
            .cloned()
            .unwrap_or_else(|| self.resolver.resolve(&first.page_img_file_name));

        let fragments =
            dedup_preserving_order(rows.iter().filter_map(|r| r.txt_file_name.as_deref()));
        let text_content = if fragments.is_empty() {
            None
        } else {
            assemble_transcript(texts, &fragments, self.text_timeout).await
        };

        Ok(ColumnDetail {
            id: first.id.clone(),
            column_title: first.column_title.clone(),
            first_img_file_name: first.first_img_file_name.clone(),
            publish_date: first.publish_date,
            genre: first.genre.clone(),
            author: self.author.clone(),
            publish_date_display: format_publish_date(first.publish_date),
            image_url,
            image_urls,
            source,
            text_content,
        })
    }
}

/// Remove duplicates, keeping the first occurrence of each item.
pub fn dedup_preserving_order<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(*item)).collect()
}

/// Fetch text fragments concurrently and join the ones that loaded.
///
/// Output order follows `keys`, not fetch completion. A fragment that is
/// missing, unreadable, or slower than `timeout` is omitted without
/// affecting its siblings. Returns `None` when nothing loaded.
pub async fn assemble_transcript(
    store: &dyn ObjectStore,
    keys: &[&str],
    timeout: Duration,
) -> Option<String> {
    let bodies = join_all(keys.iter().map(|key| fetch_fragment(store, key, timeout))).await;
    let loaded: Vec<String> = bodies.into_iter().flatten().collect();
    if loaded.is_empty() {
        None
    } else {
        Some(loaded.join(TRANSCRIPT_SEPARATOR))
    }
}

async fn fetch_fragment(store: &dyn ObjectStore, key: &str, timeout: Duration) -> Option<String> {
    match tokio::time::timeout(timeout, store.get(key)).await {
        Ok(Ok(Some(object))) => Some(object.text()),
        Ok(Ok(None)) => {
            tracing::debug!(key, "text fragment not found");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(key, error = %e, "text fragment failed to load");
            None
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(key, timeout_ms, "text fragment fetch timed out");
            None
        }
    }
}

async fn inline_image(store: &dyn ObjectStore, key: &str, timeout: Duration) -> Option<String> {
    match tokio::time::timeout(timeout, store.get(key)).await {
        Ok(Ok(Some(object))) => Some(object.to_data_url()),
        Ok(Ok(None)) => {
            tracing::debug!(key, "inline image not found");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(key, error = %e, "inline image failed to load");
            None
        }
        Err(_) => {
            let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(key, timeout_ms, "inline image fetch timed out");
            None
        }
    }
}
