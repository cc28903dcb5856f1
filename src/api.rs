// src/api.rs
//! HTTP surface consumed by the display layer. Handlers stay thin: state
//! wiring, error→status mapping, and the JSON shapes the client sees.

use std::sync::{Arc, RwLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::acquire::BatchSource;
use crate::config::{Settings, MODEL_CATALOG};
use crate::enrich::DynEnrichment;
use crate::error::RadarError;
use crate::filter::FilterApplier;
use crate::prefs::{PreferenceStore, MIN_VOTES_FOR_SYNTHESIS};
use crate::profile::{synthesize_profile, ProfileStore, StoredProfile};
use crate::reader::{CuratedReader, ReaderConfig, ReaderStatus};
use crate::types::{AnalysisResult, FilteredNewsItem, NewsItem, Vote};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
    pub prefs: Arc<PreferenceStore>,
    pub enrichment: DynEnrichment,
    pub source: Arc<dyn BatchSource>,
    pub profiles: Arc<ProfileStore>,
    pub reader: Arc<RwLock<Option<Arc<CuratedReader>>>>,
    pub reader_cfg: ReaderConfig,
}

impl AppState {
    /// Install a reader for the given filter text, replacing any previous
    /// one (the old session's queue dies with it).
    pub fn install_reader(&self, nlf: String) -> Arc<CuratedReader> {
        let reader = CuratedReader::new(
            self.source.clone(),
            FilterApplier::new(self.enrichment.clone()),
            nlf,
            self.reader_cfg,
        );
        *self.reader.write().expect("reader slot poisoned") = Some(reader.clone());
        reader
    }

    fn current_reader(&self) -> Option<Arc<CuratedReader>> {
        self.reader.read().expect("reader slot poisoned").clone()
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/settings", get(get_settings).post(save_settings))
        .route("/api/feed", get(get_feed))
        .route("/api/vote", post(post_vote))
        .route("/api/votes", get(get_votes))
        .route("/api/votes/reset", post(reset_votes))
        .route("/api/analyze", post(post_analyze))
        .route("/api/profile", get(get_profile).post(save_profile))
        .route("/api/profile/export", get(export_profile))
        .route("/api/reader/page", post(reader_page))
        .route("/api/reader/status", get(reader_status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(err: RadarError) -> ApiError {
    let status = match &err {
        RadarError::CredentialMissing => StatusCode::UNAUTHORIZED,
        RadarError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
        RadarError::NetworkUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        RadarError::NotEnoughVotes { .. } => StatusCode::BAD_REQUEST,
        RadarError::EmptyModelResponse | RadarError::ModelShape(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody { error: err.to_string() }))
}

// ---- Settings ----

#[derive(Serialize)]
struct ModelInfo {
    id: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsOut {
    model_id: String,
    language: String,
    has_api_key: bool,
    models: Vec<ModelInfo>,
}

fn settings_out(settings: &Settings) -> SettingsOut {
    SettingsOut {
        model_id: settings.model_id.clone(),
        language: settings.language.clone(),
        has_api_key: settings.resolved_api_key().is_some(),
        models: MODEL_CATALOG
            .iter()
            .map(|&(id, name)| ModelInfo { id, name })
            .collect(),
    }
}

async fn get_settings(State(state): State<AppState>) -> Json<SettingsOut> {
    let settings = state.settings.read().expect("settings lock poisoned");
    Json(settings_out(&settings))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsUpdate {
    api_key: Option<String>,
    model_id: Option<String>,
    language: Option<String>,
}

async fn save_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<SettingsOut>, ApiError> {
    let snapshot = {
        let mut settings = state.settings.write().expect("settings lock poisoned");
        if let Some(key) = update.api_key {
            settings.api_key = key;
        }
        if let Some(model) = update.model_id {
            if !model.trim().is_empty() {
                settings.model_id = model;
            }
        }
        if let Some(language) = update.language {
            if !language.trim().is_empty() {
                settings.language = language;
            }
        }
        settings.clone()
    };
    snapshot
        .save()
        .map_err(|e| error_response(RadarError::Io(e)))?;
    info!(model = %snapshot.model_id, "settings saved");
    Ok(Json(settings_out(&snapshot)))
}

// ---- Voting lab feed ----

#[derive(Deserialize)]
struct FeedQuery {
    #[serde(default)]
    page: usize,
    size: Option<usize>,
}

async fn get_feed(
    State(state): State<AppState>,
    Query(q): Query<FeedQuery>,
) -> Result<Json<Vec<NewsItem>>, ApiError> {
    let size = q.size.unwrap_or(10);
    let batch = state
        .source
        .fetch_batch(size, q.page)
        .await
        .map_err(error_response)?;
    Ok(Json(batch))
}

// ---- Votes ----

#[derive(Deserialize)]
struct VoteReq {
    item: NewsItem,
    /// Absent or null retracts a previous vote.
    #[serde(default)]
    vote: Option<Vote>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VotesOut {
    count: usize,
    likes: usize,
    dislikes: usize,
    required: usize,
    analysis_ready: bool,
}

fn votes_out(prefs: &PreferenceStore) -> VotesOut {
    let (likes, dislikes) = prefs.tally();
    let count = prefs.count();
    VotesOut {
        count,
        likes,
        dislikes,
        required: MIN_VOTES_FOR_SYNTHESIS,
        analysis_ready: count >= MIN_VOTES_FOR_SYNTHESIS,
    }
}

async fn post_vote(State(state): State<AppState>, Json(req): Json<VoteReq>) -> Json<VotesOut> {
    let id = req.item.id.clone();
    state.prefs.record_vote(&id, req.item, req.vote);
    Json(votes_out(&state.prefs))
}

async fn get_votes(State(state): State<AppState>) -> Json<VotesOut> {
    Json(votes_out(&state.prefs))
}

async fn reset_votes(State(state): State<AppState>) -> Json<VotesOut> {
    state.prefs.clear();
    Json(votes_out(&state.prefs))
}

// ---- Analysis & profile ----

async fn post_analyze(State(state): State<AppState>) -> Result<Json<AnalysisResult>, ApiError> {
    let result = synthesize_profile(&state.prefs, state.enrichment.as_ref())
        .await
        .map_err(error_response)?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveProfileReq {
    natural_language_filter: String,
    /// Empty for hand-written filters entered without running analysis.
    #[serde(default)]
    persona: String,
    #[serde(default)]
    tags: Vec<String>,
}

async fn save_profile(
    State(state): State<AppState>,
    Json(req): Json<SaveProfileReq>,
) -> Result<Json<StoredProfile>, ApiError> {
    if req.natural_language_filter.trim().is_empty() {
        return Err(error_response(RadarError::General(
            "filter text must not be empty".to_string(),
        )));
    }
    let profile = StoredProfile {
        persona: req.persona,
        natural_language_filter: req.natural_language_filter,
        tags: req.tags,
        saved_at: chrono::Utc::now(),
    };
    state
        .profiles
        .save(&profile)
        .map_err(|e| error_response(RadarError::Io(e)))?;
    state.install_reader(profile.natural_language_filter.clone());
    info!("profile saved, reader rebuilt");
    Ok(Json(profile))
}

async fn get_profile(State(state): State<AppState>) -> Json<Option<StoredProfile>> {
    Json(state.profiles.load())
}

async fn export_profile(State(state): State<AppState>) -> Result<String, ApiError> {
    match state.profiles.load() {
        Some(profile) => Ok(profile.export_blob()),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody { error: "no saved profile to export".to_string() }),
        )),
    }
}

// ---- Curated reader ----

#[derive(Deserialize, Default)]
struct PageReq {
    #[serde(default)]
    initial: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageOut {
    items: Vec<FilteredNewsItem>,
    status: ReaderStatus,
}

fn no_active_filter() -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(ErrorBody {
            error: "no active filter; run an analysis or save one manually".to_string(),
        }),
    )
}

async fn reader_page(
    State(state): State<AppState>,
    Json(req): Json<PageReq>,
) -> Result<Json<PageOut>, ApiError> {
    let reader = match state.current_reader() {
        Some(reader) => reader,
        // Resume the persisted profile if one exists.
        None => match state.profiles.load() {
            Some(profile) => state.install_reader(profile.natural_language_filter),
            None => return Err(no_active_filter()),
        },
    };

    let items = reader.load_more(req.initial).await;
    let status = reader.status().await;

    // An empty first page with a recorded failure is an error state, not a
    // "filter too strict" outcome; later failures surface via the status.
    if items.is_empty() && status.displayed == 0 {
        if let Some(error) = status.last_error.clone() {
            return Err((StatusCode::BAD_GATEWAY, Json(ErrorBody { error })));
        }
    }

    Ok(Json(PageOut { items, status }))
}

async fn reader_status(State(state): State<AppState>) -> Result<Json<ReaderStatus>, ApiError> {
    match state.current_reader() {
        Some(reader) => Ok(Json(reader.status().await)),
        None => Err(no_active_filter()),
    }
}
