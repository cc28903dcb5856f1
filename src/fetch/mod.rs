// src/fetch/mod.rs
//! Single-feed fetching through an ordered list of proxy relays.

pub mod parse;
pub mod proxy;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::types::{FeedSource, RawItem};
use self::proxy::ProxyStrategy;

/// Extracted items are capped per feed regardless of how many the document
/// carries.
pub const MAX_ITEMS_PER_FEED: usize = 5;

/// Each proxy attempt gets its own clock; an expiry falls through to the
/// next strategy.
const PROXY_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(6);

/// Boundary contract for one feed: a bounded list of raw items, or empty on
/// total failure. A dead feed is the caller's fallback problem, never a
/// pipeline abort, so this surface has no error type at all.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    async fn fetch(&self, source: &FeedSource) -> Vec<RawItem>;
}

pub struct FeedFetcher {
    http: reqwest::Client,
}

impl FeedFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .build()
            .expect("reqwest client");
        Self { http }
    }

    async fn attempt(&self, strategy: ProxyStrategy, source: &FeedSource) -> Option<Vec<RawItem>> {
        let url = strategy.wrap(source.url);

        let resp = self.http.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let body = resp.text().await.ok()?;
        if !looks_like_feed(&body) {
            return None;
        }

        match parse::extract_items(&body, source.name, MAX_ITEMS_PER_FEED) {
            Ok(items) if !items.is_empty() => Some(items),
            Ok(_) => None,
            Err(e) => {
                debug!(feed = source.name, proxy = strategy.name(), error = %e, "feed parse failed");
                None
            }
        }
    }
}

impl Default for FeedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchFeed for FeedFetcher {
    async fn fetch(&self, source: &FeedSource) -> Vec<RawItem> {
        let t0 = Instant::now();

        for strategy in ProxyStrategy::ORDERED {
            counter!("feed_proxy_attempts_total").increment(1);

            let outcome = timeout(PROXY_ATTEMPT_TIMEOUT, self.attempt(strategy, source))
                .await
                .ok()
                .flatten();

            if let Some(items) = outcome {
                histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
                debug!(
                    feed = source.name,
                    proxy = strategy.name(),
                    items = items.len(),
                    "feed fetched"
                );
                return items;
            }
        }

        warn!(feed = source.name, "all proxy strategies failed");
        counter!("feed_fetch_failures_total").increment(1);
        Vec::new()
    }
}

/// Cheap sanity check before spending a parse on an arbitrary proxy body.
pub fn looks_like_feed(body: &str) -> bool {
    !body.is_empty() && (body.contains("<rss") || body.contains("<feed") || body.contains("<xml"))
}
