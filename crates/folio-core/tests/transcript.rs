//! Transcript assembly and inline listings against stores that stall or fail.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use folio_core::projector::{INLINE_IMAGE_CONCURRENCY, assemble_transcript};
use folio_core::{ImageResolver, ObjectStore, Projector, StorageError, StoredObject};
use folio_types::{ColumnRecord, DataSource};

/// A store whose objects each answer after a fixed delay.
#[derive(Debug, Default)]
struct DelayedStore {
    objects: HashMap<String, (Duration, &'static str)>,
    broken: Vec<&'static str>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl DelayedStore {
    fn with(mut self, key: impl Into<String>, delay_ms: u64, body: &'static str) -> Self {
        self.objects.insert(key.into(), (Duration::from_millis(delay_ms), body));
        self
    }

    fn with_broken(mut self, key: &'static str) -> Self {
        self.broken.push(key);
        self
    }
}

#[async_trait]
impl ObjectStore for DelayedStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        if self.broken.contains(&key) {
            return Err(StorageError::Io {
                key: key.to_owned(),
                source: std::io::Error::other("disk on fire"),
            });
        }
        let Some((delay, body)) = self.objects.get(key) else {
            return Ok(None);
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(*delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(StoredObject::new(body.as_bytes().to_vec(), None)))
    }
}

#[tokio::test(start_paused = true)]
async fn order_follows_keys_not_completion() {
    let store = DelayedStore::default()
        .with("first.txt", 300, "first")
        .with("second.txt", 10, "second")
        .with("third.txt", 150, "third");

    let text = assemble_transcript(
        &store,
        &["first.txt", "second.txt", "third.txt"],
        Duration::from_secs(1),
    )
    .await;

    assert_eq!(text.as_deref(), Some("first\n\nsecond\n\nthird"));
}

#[tokio::test(start_paused = true)]
async fn slow_fragment_is_dropped_without_affecting_siblings() {
    let store = DelayedStore::default()
        .with("fast.txt", 5, "fast")
        .with("slow.txt", 10_000, "slow")
        .with("also-fast.txt", 20, "also fast");

    let text = assemble_transcript(
        &store,
        &["fast.txt", "slow.txt", "also-fast.txt"],
        Duration::from_millis(500),
    )
    .await;

    assert_eq!(text.as_deref(), Some("fast\n\nalso fast"));
}

#[tokio::test(start_paused = true)]
async fn fetches_run_concurrently() {
    let store = DelayedStore::default()
        .with("a.txt", 400, "a")
        .with("b.txt", 400, "b")
        .with("c.txt", 400, "c");

    let started = tokio::time::Instant::now();
    let text = assemble_transcript(&store, &["a.txt", "b.txt", "c.txt"], Duration::from_secs(1)).await;

    assert_eq!(text.as_deref(), Some("a\n\nb\n\nc"));
    assert!(started.elapsed() < Duration::from_millis(800));
}

#[tokio::test]
async fn read_errors_and_misses_are_omitted() {
    let store = DelayedStore::default()
        .with("ok.txt", 0, "kept")
        .with_broken("bad.txt");

    let text = assemble_transcript(
        &store,
        &["bad.txt", "missing.txt", "ok.txt"],
        Duration::from_secs(1),
    )
    .await;
    assert_eq!(text.as_deref(), Some("kept"));

    let nothing = assemble_transcript(&store, &["bad.txt", "missing.txt"], Duration::from_secs(1)).await;
    assert!(nothing.is_none());
}

#[tokio::test]
async fn fs_store_serves_fragments_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.txt"), "from disk").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested/two.txt"), "nested fragment").unwrap();

    let store = folio_core::FsObjectStore::new(dir.path());
    let text = assemble_transcript(
        &store,
        &["one.txt", "nested/two.txt", "absent.txt"],
        Duration::from_secs(1),
    )
    .await;

    assert_eq!(text.as_deref(), Some("from disk\n\nnested fragment"));
}

fn record(id: &str) -> ColumnRecord {
    ColumnRecord {
        id: id.to_owned(),
        column_title: id.to_uppercase(),
        first_img_file_name: Some(format!("{id}.png")),
        publish_date: NaiveDate::from_ymd_opt(1987, 3, 5).unwrap(),
        genre: None,
    }
}

fn inline_projector(timeout: Duration) -> Projector {
    Projector::new(ImageResolver::inline("/images"), "Frank Walsh").with_text_timeout(timeout)
}

#[tokio::test(start_paused = true)]
async fn inline_listing_drops_slow_images_and_keeps_order() {
    let store = DelayedStore::default()
        .with("a.png", 300, "a")
        .with("b.png", 10_000, "b")
        .with("c.png", 5, "c");
    let records = vec![record("a"), record("b"), record("c")];

    let listing = inline_projector(Duration::from_millis(500))
        .project_listing(&records, &store, DataSource::Mock)
        .await;

    let ids: Vec<&str> = listing.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(listing.columns[0].image_data.as_deref().unwrap().starts_with("data:"));
    assert!(listing.columns[1].image_data.is_none());
    assert_eq!(listing.columns[1].image_url.as_deref(), Some("/images/b.png"));
    assert!(listing.columns[2].image_data.is_some());
}

#[tokio::test(start_paused = true)]
async fn inline_listing_limits_reads_in_flight() {
    let count = INLINE_IMAGE_CONCURRENCY * 3;
    let ids: Vec<String> = (0..count).map(|i| format!("col-{i}")).collect();
    let store = ids
        .iter()
        .fold(DelayedStore::default(), |store, id| store.with(format!("{id}.png"), 100, "img"));
    let records: Vec<ColumnRecord> = ids.iter().map(|id| record(id)).collect();

    let listing = inline_projector(Duration::from_secs(1))
        .project_listing(&records, &store, DataSource::Database)
        .await;

    assert!(listing.columns.iter().all(|c| c.image_data.is_some()));
    let peak = store.peak.load(Ordering::SeqCst);
    assert!(peak > 1, "reads should overlap, peak was {peak}");
    assert!(peak <= INLINE_IMAGE_CONCURRENCY, "peak {peak} exceeded the limit");
}
