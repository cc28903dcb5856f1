// src/acquire.rs
//! Batch acquisition: a rotating window of feeds fetched in parallel, a
//! randomized fallback wave when yield is low, then enrichment into
//! session-unique `NewsItem`s.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use metrics::counter;
use rand::seq::SliceRandom;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::enrich::{DynEnrichment, RawProjection};
use crate::error::{RadarError, Result};
use crate::fetch::FetchFeed;
use crate::sources;
use crate::types::{FeedSource, NewsItem, RawItem};

/// Label applied when the model drops the echoed source field.
const DEFAULT_SOURCE_LABEL: &str = "Tech News";

/// Description cap inside the enrichment projection; the raw item keeps its
/// longer form.
const PROJECTION_DESC_CHARS: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct AcquirerConfig {
    /// Combined primary yield below this triggers the fallback wave.
    pub low_water_mark: usize,
    /// How many untried feeds the fallback wave consults.
    pub fallback_feeds: usize,
}

impl Default for AcquirerConfig {
    fn default() -> Self {
        Self { low_water_mark: 5, fallback_feeds: 5 }
    }
}

/// One page of enriched news, or a terminal (retryable) error. The reader
/// pipeline depends on this seam rather than on the concrete acquirer.
#[async_trait]
pub trait BatchSource: Send + Sync {
    async fn fetch_batch(&self, batch_size: usize, page: usize) -> Result<Vec<NewsItem>>;
}

pub struct BatchAcquirer {
    registry: &'static [FeedSource],
    fetcher: Arc<dyn FetchFeed>,
    enrichment: DynEnrichment,
    settings: Arc<RwLock<Settings>>,
    cfg: AcquirerConfig,
    /// Session-scoped sequence feeding id generation; monotonic so repeated
    /// calls with the same page index still mint distinct ids.
    seq: AtomicU64,
}

impl BatchAcquirer {
    pub fn new(
        registry: &'static [FeedSource],
        fetcher: Arc<dyn FetchFeed>,
        enrichment: DynEnrichment,
        settings: Arc<RwLock<Settings>>,
        cfg: AcquirerConfig,
    ) -> Self {
        Self { registry, fetcher, enrichment, settings, cfg, seq: AtomicU64::new(0) }
    }

    /// Fire-and-await-all fetch of one wave of feeds.
    async fn fetch_wave(&self, feeds: &[&'static FeedSource]) -> Vec<RawItem> {
        let mut set = JoinSet::new();
        for feed in feeds {
            let fetcher = self.fetcher.clone();
            let feed: &'static FeedSource = feed;
            set.spawn(async move { fetcher.fetch(feed).await });
        }

        let mut items = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(mut batch) => items.append(&mut batch),
                Err(e) => warn!(error = %e, "feed fetch task panicked"),
            }
        }
        items
    }

    async fn enrich(&self, raw: Vec<RawItem>, page: usize) -> Result<Vec<NewsItem>> {
        let language = {
            let s = self.settings.read().expect("settings lock poisoned");
            s.language.clone()
        };

        let projection: Vec<RawProjection> = raw
            .iter()
            .map(|it| RawProjection {
                s: it.source_name.clone(),
                t: it.title.clone(),
                d: truncate_chars(&it.description, PROJECTION_DESC_CHARS),
                l: it.link.clone(),
            })
            .collect();

        let rows = self.enrichment.enrich_batch(&projection, &language).await?;
        counter!("enrich_calls_total").increment(1);

        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(idx, row)| NewsItem {
                id: format!("news-{page}-{seq}-{idx}"),
                source: row
                    .source
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string()),
                title: row.title,
                summary: row.summary,
                category: row.category,
                link: row.link,
            })
            .collect())
    }
}

#[async_trait]
impl BatchSource for BatchAcquirer {
    async fn fetch_batch(&self, batch_size: usize, page: usize) -> Result<Vec<NewsItem>> {
        let window = sources::rotation_window(self.registry.len(), page);
        let primary: Vec<&'static FeedSource> =
            window.iter().map(|&i| &self.registry[i]).collect();

        let mut raw = self.fetch_wave(&primary).await;

        if raw.len() < self.cfg.low_water_mark {
            debug!(
                page,
                got = raw.len(),
                "primary window below low-water mark, trying fallback feeds"
            );
            let tried: HashSet<&str> = primary.iter().map(|f| f.name).collect();
            let mut rest: Vec<&'static FeedSource> = self
                .registry
                .iter()
                .filter(|f| !tried.contains(f.name))
                .collect();
            {
                let mut rng = rand::rng();
                rest.shuffle(&mut rng);
            }
            rest.truncate(self.cfg.fallback_feeds);

            let mut fallback = self.fetch_wave(&rest).await;
            raw.append(&mut fallback);
        }

        {
            let mut rng = rand::rng();
            raw.shuffle(&mut rng);
        }
        raw.truncate(batch_size + 2);

        if raw.is_empty() {
            counter!("acquire_empty_total").increment(1);
            return Err(RadarError::NetworkUnavailable);
        }
        counter!("acquire_raw_items_total").increment(raw.len() as u64);

        self.enrich(raw, page).await
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}
