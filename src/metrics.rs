// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_proxy_attempts_total", "Proxy attempts across all feeds.");
        describe_counter!(
            "feed_fetch_failures_total",
            "Feeds where every proxy strategy failed."
        );
        describe_histogram!("feed_fetch_ms", "Successful single-feed fetch time in milliseconds.");
        describe_counter!("acquire_raw_items_total", "Raw items entering enrichment.");
        describe_counter!(
            "acquire_empty_total",
            "Batch acquisitions where no source yielded anything."
        );
        describe_counter!("enrich_calls_total", "Batch enrichment round trips.");
        describe_counter!("filter_pass_total", "Items passed by the active filter.");
        describe_counter!("filter_reject_total", "Items rejected by the active filter.");
        describe_counter!("reader_fill_attempts_total", "Reader queue fill attempts.");
        describe_counter!(
            "reader_batch_failures_total",
            "Fetch or filter failures absorbed by the reader."
        );
        describe_gauge!("reader_queue_depth", "Filtered items buffered ahead of display.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder and register series descriptions.
    pub fn init() -> Self {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("prometheus: install recorder");
        ensure_described();
        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
