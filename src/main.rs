//! News Radar — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_radar::acquire::{AcquirerConfig, BatchAcquirer, BatchSource};
use news_radar::api::{self, AppState};
use news_radar::config::Settings;
use news_radar::enrich::{gemini::GeminiClient, DynEnrichment};
use news_radar::fetch::{FeedFetcher, FetchFeed};
use news_radar::metrics::Metrics;
use news_radar::prefs::PreferenceStore;
use news_radar::profile::ProfileStore;
use news_radar::reader::ReaderConfig;
use news_radar::sources;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_radar=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let metrics = Metrics::init();

    let settings = Arc::new(RwLock::new(Settings::load()));
    let enrichment: DynEnrichment = Arc::new(GeminiClient::new(settings.clone()));
    let fetcher: Arc<dyn FetchFeed> = Arc::new(FeedFetcher::new());
    let source: Arc<dyn BatchSource> = Arc::new(BatchAcquirer::new(
        sources::REGISTRY,
        fetcher,
        enrichment.clone(),
        settings.clone(),
        AcquirerConfig::default(),
    ));

    let state = AppState {
        settings,
        prefs: Arc::new(PreferenceStore::new()),
        enrichment,
        source,
        profiles: Arc::new(ProfileStore::from_env()),
        reader: Arc::new(RwLock::new(None)),
        reader_cfg: ReaderConfig::default(),
    };

    // Resume the persisted profile, if any, so the reader works immediately.
    if let Some(profile) = state.profiles.load() {
        info!(saved_at = %profile.saved_at, "active profile loaded from disk");
        state.install_reader(profile.natural_language_filter);
    }

    let app = api::create_router(state).merge(metrics.router());

    let addr: SocketAddr = std::env::var("RADAR_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
        .parse()?;
    info!(%addr, feeds = sources::REGISTRY.len(), "news-radar listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
