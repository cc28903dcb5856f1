// src/enrich/gemini.rs
//! Gemini `generateContent` provider. Credential and model id are resolved
//! from settings per call, so edits apply without rebuilding the client.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Settings;
use crate::error::{RadarError, Result};
use crate::types::AnalysisResult;

use super::{EnrichedRow, EnrichmentClient, FilterProjection, PassVerdict, RawProjection};

const GENERATE_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    http: reqwest::Client,
    settings: Arc<RwLock<Settings>>,
}

impl GeminiClient {
    pub fn new(settings: Arc<RwLock<Settings>>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("news-radar/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self { http, settings }
    }

    fn context(&self) -> Result<(String, String)> {
        let s = self.settings.read().expect("settings lock poisoned");
        let key = s.resolved_api_key().ok_or(RadarError::CredentialMissing)?;
        Ok((key, s.model_id.clone()))
    }

    /// One structured-JSON generation round trip. Returns the raw response
    /// text; callers deserialize against their own contract.
    async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig<'a> {
            response_mime_type: &'a str,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig<'a>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            text: Option<String>,
        }

        let (key, model) = self.context()?;
        let url = format!("{GENERATE_BASE}/{model}:generateContent");
        let req = Req {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { response_mime_type: "application/json" },
        };

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &key)
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RadarError::QuotaExceeded);
        }
        if !status.is_success() {
            return Err(RadarError::General(format!("model endpoint returned HTTP {status}")));
        }

        let body: Resp = resp.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RadarError::EmptyModelResponse);
        }
        debug!(model = %model, bytes = text.len(), "model response received");
        Ok(text)
    }
}

#[async_trait]
impl EnrichmentClient for GeminiClient {
    async fn enrich_batch(
        &self,
        items: &[RawProjection],
        language: &str,
    ) -> Result<Vec<EnrichedRow>> {
        let input = serde_json::to_string(items)?;
        let prompt = format!(
            "You are a tech news editor. Translate and summarize these RSS items into {language}.\n\
             \n\
             Input format: JSON array of {{s: source, t: title, d: description, l: link}}.\n\
             \n\
             Requirements:\n\
             1. title: translate into {language}.\n\
             2. summary: condense \"d\" into strictly ONE sentence in {language}.\n\
             3. category: assign one (e.g. AI, Consumer Tech, Science, Business, Dev, Security).\n\
             4. Echo \"link\" and \"source\" back unchanged.\n\
             5. Return a JSON array of {{title, summary, category, link, source}}, one per input item, in input order.\n\
             \n\
             Input:\n{input}"
        );
        let text = self.generate(&prompt).await?;
        serde_json::from_str(&text).map_err(|e| RadarError::ModelShape(e.to_string()))
    }

    async fn synthesize_profile(
        &self,
        likes: &[String],
        dislikes: &[String],
    ) -> Result<AnalysisResult> {
        let likes_json = serde_json::to_string(likes)?;
        let dislikes_json = serde_json::to_string(dislikes)?;
        let prompt = format!(
            "You are this user's chief intelligence officer. From the vote history below, build a \
             high-precision psychological profile and an executable natural-language filter.\n\
             \n\
             Liked:\n{likes_json}\n\
             \n\
             Disliked:\n{dislikes_json}\n\
             \n\
             Critical requirements — produce a logic instruction set, not a vague summary:\n\
             1. Granularity: name concrete sub-fields and technology niches, never platitudes.\n\
             2. Conflict resolution: define explicit priority rules for items that mix excluded \
             and preferred traits.\n\
             3. Thresholds: state what level of signal clears the bar and what counts as noise.\n\
             \n\
             Return a JSON object with exactly these fields:\n\
             1. \"persona\": ~300 words analyzing the user's information metabolism — cognitive \
             bandwidth, value anchors, what their dislikes really reject, and blind spots.\n\
             2. \"naturalLanguageFilter\": a system prompt addressed to an AI agent in the second \
             person, with these sections: [ROLE DEFINITION], [PASS_GATES], [BLOCK_GATES], \
             [RESOLUTION_LOGIC] (IF/THEN arbitration rules), [SUMMARIZATION_STYLE].\n\
             3. \"tags\": 3-5 sharply specific tags.\n"
        );
        let text = self.generate(&prompt).await?;
        serde_json::from_str(&text).map_err(|e| RadarError::ModelShape(e.to_string()))
    }

    async fn filter_items(
        &self,
        items: &[FilterProjection],
        filter: &str,
    ) -> Result<Vec<PassVerdict>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Passed {
            #[serde(default)]
            passed_items: Vec<PassVerdict>,
        }

        let input = serde_json::to_string(items)?;
        // The filter string is embedded verbatim; its internal structure is
        // the model's business, not ours.
        let prompt = format!(
            "[SYSTEM INSTRUCTION]\n{filter}\n\n\
             [TASK]\n\
             Review the following news items based STRICTLY on the system instruction above.\n\
             Return a JSON object {{\"passedItems\": [...]}} listing only the items that passed, \
             each as {{\"id\": original id, \"passReason\": 6-10 words naming the specific gate it hit}}.\n\
             \n\
             [NEWS ITEMS]\n{input}"
        );
        let text = self.generate(&prompt).await?;
        let parsed: Passed =
            serde_json::from_str(&text).map_err(|e| RadarError::ModelShape(e.to_string()))?;
        Ok(parsed.passed_items)
    }
}
