// src/reader.rs
//! Curated reader: a continuously replenished, deduplicated, filtered queue
//! serving fixed-size pages, with background prefetch ahead of demand.
//!
//! All shared state lives behind one async-aware lock held across each
//! fill, so a user-driven `load_more` and the background preload serialize
//! on the page cursor instead of interleaving.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use metrics::{counter, gauge};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::acquire::BatchSource;
use crate::filter::FilterApplier;
use crate::types::FilteredNewsItem;

#[derive(Debug, Clone, Copy)]
pub struct ReaderConfig {
    /// Items served per page.
    pub page_size: usize,
    /// Raw batch size requested per fill attempt; slightly above the page
    /// size to improve the filter hit rate per round trip.
    pub fetch_batch_size: usize,
    /// Fill attempts per request before giving up short.
    pub max_fill_attempts: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { page_size: 10, fetch_batch_size: 15, max_fill_attempts: 6 }
    }
}

#[derive(Debug, Default)]
struct ReaderState {
    /// Everything already served, append-only until an explicit restart.
    displayed: Vec<FilteredNewsItem>,
    displayed_ids: HashSet<String>,
    /// Filtered items awaiting display.
    queue: VecDeque<FilteredNewsItem>,
    queued_ids: HashSet<String>,
    /// Next raw page index to request; bumped before the fetch resolves.
    page_cursor: usize,
    /// Cumulative raw items examined, for user-facing progress.
    scanned: usize,
    /// Most recent absorbed failure, for non-destructive surfacing.
    last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderStatus {
    pub scanned: usize,
    pub displayed: usize,
    pub queued: usize,
    pub page_cursor: usize,
    pub preloading: bool,
    /// True when a full next page is already buffered.
    pub next_page_ready: bool,
    pub last_error: Option<String>,
}

pub struct CuratedReader {
    source: Arc<dyn BatchSource>,
    filter: FilterApplier,
    /// Active filter-policy document, forwarded verbatim on every call.
    nlf: String,
    cfg: ReaderConfig,
    state: Mutex<ReaderState>,
    preloading: AtomicBool,
    /// Self-handle so `&self` methods can hand an owned clone to the
    /// background preload task.
    me: Weak<CuratedReader>,
}

impl CuratedReader {
    pub fn new(
        source: Arc<dyn BatchSource>,
        filter: FilterApplier,
        nlf: String,
        cfg: ReaderConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            source,
            filter,
            nlf,
            cfg,
            state: Mutex::new(ReaderState::default()),
            preloading: AtomicBool::new(false),
            me: me.clone(),
        })
    }

    pub fn filter_text(&self) -> &str {
        &self.nlf
    }

    /// One fetch+filter round trip. Failures are absorbed here: a dead
    /// batch contributes zero items and the caller counts a wasted attempt.
    async fn fetch_and_filter(&self, state: &mut ReaderState) -> Vec<FilteredNewsItem> {
        let page = state.page_cursor;
        state.page_cursor += 1;

        let raw = match self.source.fetch_batch(self.cfg.fetch_batch_size, page).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(page, error = %e, "batch fetch failed");
                counter!("reader_batch_failures_total").increment(1);
                state.last_error = Some(e.to_string());
                return Vec::new();
            }
        };
        state.scanned += raw.len();

        match self.filter.apply(&raw, &self.nlf).await {
            Ok(passed) => {
                state.last_error = None;
                passed
            }
            Err(e) => {
                warn!(page, error = %e, "filter call failed");
                counter!("reader_batch_failures_total").increment(1);
                state.last_error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    /// Top the queue up to `target`, bounded by the attempt ceiling. Items
    /// already displayed or already queued never enter twice.
    async fn fill_queue(&self, state: &mut ReaderState, target: usize) {
        let mut attempts = 0;
        while state.queue.len() < target && attempts < self.cfg.max_fill_attempts {
            counter!("reader_fill_attempts_total").increment(1);
            let passed = self.fetch_and_filter(state).await;
            for item in passed {
                let id = &item.item.id;
                if state.displayed_ids.contains(id) || state.queued_ids.contains(id) {
                    continue;
                }
                state.queued_ids.insert(id.clone());
                state.queue.push_back(item);
            }
            attempts += 1;
        }
        gauge!("reader_queue_depth").set(state.queue.len() as f64);
    }

    /// Serve the next page. `initial` resets the whole session first. The
    /// call resolves once the page is ready or attempts are exhausted, in
    /// which case fewer than `page_size` items come back; on return a
    /// background prefetch is triggered for the page after this one.
    pub async fn load_more(&self, initial: bool) -> Vec<FilteredNewsItem> {
        let mut state = self.state.lock().await;
        if initial {
            *state = ReaderState::default();
        }
        self.fill_queue(&mut state, self.cfg.page_size).await;

        let mut page = Vec::with_capacity(self.cfg.page_size);
        while page.len() < self.cfg.page_size {
            let Some(item) = state.queue.pop_front() else { break };
            state.queued_ids.remove(&item.item.id);
            state.displayed_ids.insert(item.item.id.clone());
            state.displayed.push(item.clone());
            page.push(item);
        }
        gauge!("reader_queue_depth").set(state.queue.len() as f64);
        debug!(served = page.len(), queued = state.queue.len(), "page served");
        drop(state);

        self.trigger_preload().await;
        page
    }

    /// Kick a background top-up unless one is already running or the buffer
    /// already covers the next page. Returns as soon as the work is
    /// spawned; never blocks the caller on the fill itself.
    pub async fn trigger_preload(&self) {
        if self.preloading.load(Ordering::SeqCst) {
            return;
        }
        {
            let state = self.state.lock().await;
            if state.queue.len() >= self.cfg.page_size {
                return;
            }
        }
        let Some(this) = self.me.upgrade() else { return };
        if self.preloading.swap(true, Ordering::SeqCst) {
            return;
        }

        tokio::spawn(async move {
            debug!("background preload started");
            let mut state = this.state.lock().await;
            this.fill_queue(&mut state, this.cfg.page_size).await;
            drop(state);
            this.preloading.store(false, Ordering::SeqCst);
            debug!("background preload finished");
        });
    }

    pub async fn status(&self) -> ReaderStatus {
        let state = self.state.lock().await;
        ReaderStatus {
            scanned: state.scanned,
            displayed: state.displayed.len(),
            queued: state.queue.len(),
            page_cursor: state.page_cursor,
            preloading: self.preloading.load(Ordering::SeqCst),
            next_page_ready: state.queue.len() >= self.cfg.page_size,
            last_error: state.last_error.clone(),
        }
    }

    /// Everything served so far, for a reconnecting display layer.
    pub async fn displayed(&self) -> Vec<FilteredNewsItem> {
        self.state.lock().await.displayed.clone()
    }
}
