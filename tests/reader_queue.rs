// tests/reader_queue.rs
//
// Curated reader pipeline semantics against a scripted batch source:
// - fill attempts stop at the ceiling and absorb failures silently
// - nothing already displayed or queued is ever appended again
// - pages move queue → displayed and trigger a background preload
// - preload is a no-op while one runs or while the buffer covers a page
// - an initial load resets session state
// - the filter document reaches the collaborator verbatim on every call

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use news_radar::acquire::BatchSource;
use news_radar::enrich::MockEnrichment;
use news_radar::filter::FilterApplier;
use news_radar::reader::{CuratedReader, ReaderConfig};
use news_radar::types::NewsItem;
use news_radar::{RadarError, Result};

fn item(page: usize, n: usize) -> NewsItem {
    NewsItem {
        id: format!("news-{page}-{n}"),
        source: "Stub".to_string(),
        title: format!("page {page} item {n}"),
        summary: "stub summary".to_string(),
        category: "Tech".to_string(),
        link: format!("https://stub.example/{page}/{n}"),
    }
}

enum Script {
    /// Every page yields this many fresh items.
    FreshPerPage(usize),
    /// Every page yields the same fixed batch.
    SameEveryPage(Vec<NewsItem>),
    /// Every page fails.
    AlwaysFail,
}

struct ScriptedSource {
    script: Script,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedSource {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self { script, calls: Mutex::new(Vec::new()) })
    }

    fn pages_requested(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchSource for ScriptedSource {
    async fn fetch_batch(&self, _batch_size: usize, page: usize) -> Result<Vec<NewsItem>> {
        self.calls.lock().unwrap().push(page);
        match &self.script {
            Script::FreshPerPage(n) => Ok((0..*n).map(|i| item(page, i)).collect()),
            Script::SameEveryPage(batch) => Ok(batch.clone()),
            Script::AlwaysFail => Err(RadarError::NetworkUnavailable),
        }
    }
}

fn reader_over(source: Arc<ScriptedSource>) -> (Arc<CuratedReader>, Arc<MockEnrichment>) {
    let mock = Arc::new(MockEnrichment::passing_all());
    let reader = CuratedReader::new(
        source,
        FilterApplier::new(mock.clone()),
        "[ROLE DEFINITION] pass everything interesting".to_string(),
        ReaderConfig::default(),
    );
    (reader, mock)
}

async fn settle() {
    // Let any spawned preload run to completion on the test runtime.
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn serves_full_pages_and_prefetches_ahead() {
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let (reader, _) = reader_over(source.clone());

    let page = reader.load_more(true).await;
    assert_eq!(page.len(), 10);
    assert!(page.iter().all(|i| i.pass_reason.is_some()));

    settle().await;
    let status = reader.status().await;
    assert!(!status.preloading);
    assert!(status.next_page_ready, "preload should have buffered the next page");
    assert!(status.queued >= 10);
    // One fill for the page, at least one more from the preload.
    assert!(source.pages_requested().len() >= 2);
}

#[tokio::test]
async fn pages_never_overlap() {
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let (reader, _) = reader_over(source);

    let first = reader.load_more(true).await;
    settle().await;
    let second = reader.load_more(false).await;

    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 10);
    let first_ids: HashSet<_> = first.iter().map(|i| i.item.id.clone()).collect();
    assert!(second.iter().all(|i| !first_ids.contains(&i.item.id)));
}

#[tokio::test]
async fn repeated_low_yield_batches_dedup_idempotently() {
    // Every attempt returns the same 4 items; the queue must hold each once
    // no matter how many attempts run.
    let fixed: Vec<NewsItem> = (0..4).map(|i| item(0, i)).collect();
    let source = ScriptedSource::new(Script::SameEveryPage(fixed));
    let (reader, _) = reader_over(source.clone());

    let page = reader.load_more(true).await;
    assert_eq!(page.len(), 4, "only the unique survivors are served");

    // The fill loop exhausted its attempt ceiling before serving short.
    let calls_at_serve = 6;
    assert!(source.pages_requested().len() >= calls_at_serve);

    settle().await;
    // Preload attempts afterwards still add nothing new.
    let status = reader.status().await;
    assert_eq!(status.queued, 0);
    assert_eq!(status.displayed, 4);
}

#[tokio::test]
async fn failures_are_absorbed_and_bounded_by_attempt_ceiling() {
    let source = ScriptedSource::new(Script::AlwaysFail);
    let (reader, _) = reader_over(source.clone());

    let page = reader.load_more(true).await;
    assert!(page.is_empty());
    assert_eq!(source.pages_requested(), vec![0, 1, 2, 3, 4, 5]);

    settle().await;
    let status = reader.status().await;
    assert_eq!(status.scanned, 0);
    assert!(status.last_error.is_some(), "absorbed failure surfaces in status");
    assert!(!status.preloading);
}

#[tokio::test]
async fn cursor_increments_before_fetch_resolves() {
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let (reader, _) = reader_over(source.clone());

    reader.load_more(true).await;
    settle().await;
    reader.load_more(false).await;
    settle().await;

    let pages = reader.status().await.page_cursor;
    let mut requested = source.pages_requested();
    requested.sort_unstable();
    requested.dedup();
    assert_eq!(requested.len(), pages, "every cursor value was requested exactly once");
}

#[tokio::test]
async fn preload_is_a_noop_when_buffer_covers_next_page() {
    let source = ScriptedSource::new(Script::FreshPerPage(25));
    let (reader, _) = reader_over(source.clone());

    reader.load_more(true).await;
    settle().await;
    assert!(reader.status().await.next_page_ready);

    let calls_before = source.pages_requested().len();
    reader.trigger_preload().await;
    settle().await;
    assert_eq!(source.pages_requested().len(), calls_before, "full buffer: nothing fetched");
}

#[tokio::test]
async fn initial_load_resets_session_state() {
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let (reader, _) = reader_over(source.clone());

    let first = reader.load_more(true).await;
    settle().await;
    let restarted = reader.load_more(true).await;

    // Cursor went back to zero: page 0 was requested twice across sessions.
    let zero_requests = source.pages_requested().iter().filter(|&&p| p == 0).count();
    assert_eq!(zero_requests, 2);

    // The displayed set was cleared, so the same leading items serve again.
    let first_ids: Vec<_> = first.iter().map(|i| i.item.id.clone()).collect();
    let restarted_ids: Vec<_> = restarted.iter().map(|i| i.item.id.clone()).collect();
    assert_eq!(first_ids, restarted_ids);

    let status = reader.status().await;
    assert_eq!(status.displayed, 10);
}

#[tokio::test]
async fn scanned_count_accumulates_raw_batch_sizes() {
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let (reader, _) = reader_over(source.clone());

    reader.load_more(true).await;
    let calls = source.pages_requested().len();
    let status = reader.status().await;
    assert!(status.scanned >= calls * 12 - 12, "scanned tracks raw items examined");
    assert_eq!(status.scanned % 12, 0);
}

#[tokio::test]
async fn filter_document_reaches_collaborator_verbatim() {
    let nlf = "[ROLE DEFINITION] Hard-core gatekeeper — 严格.\n[PASS_GATES] kernels, compilers 🚀\n[BLOCK_GATES] funding rounds".to_string();
    let mock = Arc::new(MockEnrichment::passing_all());
    let source = ScriptedSource::new(Script::FreshPerPage(12));
    let reader = CuratedReader::new(
        source,
        FilterApplier::new(mock.clone()),
        nlf.clone(),
        ReaderConfig::default(),
    );

    reader.load_more(true).await;
    settle().await;
    reader.load_more(false).await;
    settle().await;

    let seen = mock.seen_filters.lock().unwrap();
    assert!(seen.len() >= 2);
    for received in seen.iter() {
        assert_eq!(received.as_bytes(), nlf.as_bytes(), "policy string mutated in transit");
    }
}
