// src/enrich/mod.rs
//! Enrichment collaborator: the language-model service behind a client
//! trait. Three contracts, all structured JSON: batch enrichment rows,
//! profile synthesis, and filter verdicts.

pub mod gemini;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RadarError, Result};
use crate::types::AnalysisResult;

/// Minimized projection of a raw item sent for enrichment. Single-letter
/// keys keep the request small; the description is pre-truncated by the
/// acquirer.
#[derive(Debug, Clone, Serialize)]
pub struct RawProjection {
    pub s: String,
    pub t: String,
    pub d: String,
    pub l: String,
}

/// One enriched row returned by the model. `source` is optional because
/// models occasionally drop echoed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub link: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// What the filter call sees of each item.
#[derive(Debug, Clone, Serialize)]
pub struct FilterProjection {
    pub id: String,
    pub title: String,
    pub summary: String,
}

/// Positive verdict for one item. Items the model does not name are
/// rejected (closed world).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassVerdict {
    pub id: String,
    pub pass_reason: String,
}

#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Translate, summarize and categorize a raw batch into one row per
    /// item, in input order.
    async fn enrich_batch(
        &self,
        items: &[RawProjection],
        language: &str,
    ) -> Result<Vec<EnrichedRow>>;

    /// Convert vote history (compact "[category] title" lines) into a
    /// persona, a reusable filter document, and tags.
    async fn synthesize_profile(
        &self,
        likes: &[String],
        dislikes: &[String],
    ) -> Result<AnalysisResult>;

    /// Judge items against an opaque filter-policy string, forwarded
    /// verbatim. Returns verdicts for passing items only.
    async fn filter_items(
        &self,
        items: &[FilterProjection],
        filter: &str,
    ) -> Result<Vec<PassVerdict>>;
}

pub type DynEnrichment = Arc<dyn EnrichmentClient>;

/// Deterministic stand-in for tests and credential-less local runs.
#[derive(Default)]
pub struct MockEnrichment {
    /// When set, only these ids pass filtering; otherwise everything passes.
    pub pass_ids: Option<Vec<String>>,
    /// Every filter string received, verbatim. Lets tests assert the policy
    /// document survives transit byte-identically.
    pub seen_filters: Mutex<Vec<String>>,
    /// When true, every call fails with a quota error.
    pub fail_quota: bool,
    /// When true, enriched rows come back without a source field.
    pub drop_source: bool,
}

impl MockEnrichment {
    pub fn passing_all() -> Self {
        Self::default()
    }

    pub fn passing_only<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pass_ids: Some(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn quota_exhausted() -> Self {
        Self { fail_quota: true, ..Self::default() }
    }

    fn gate(&self) -> Result<()> {
        if self.fail_quota {
            Err(RadarError::QuotaExceeded)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EnrichmentClient for MockEnrichment {
    async fn enrich_batch(
        &self,
        items: &[RawProjection],
        language: &str,
    ) -> Result<Vec<EnrichedRow>> {
        self.gate()?;
        Ok(items
            .iter()
            .map(|it| EnrichedRow {
                title: format!("[{language}] {}", it.t),
                summary: if it.d.is_empty() { it.t.clone() } else { it.d.clone() },
                category: "Tech".to_string(),
                link: it.l.clone(),
                source: if self.drop_source { None } else { Some(it.s.clone()) },
            })
            .collect())
    }

    async fn synthesize_profile(
        &self,
        likes: &[String],
        dislikes: &[String],
    ) -> Result<AnalysisResult> {
        self.gate()?;
        Ok(AnalysisResult {
            persona: format!("Reader with {} likes and {} dislikes.", likes.len(), dislikes.len()),
            natural_language_filter:
                "[ROLE DEFINITION] You pass every item.\n[PASS_GATES] anything\n[BLOCK_GATES] nothing"
                    .to_string(),
            tags: vec!["#mock".to_string()],
        })
    }

    async fn filter_items(
        &self,
        items: &[FilterProjection],
        filter: &str,
    ) -> Result<Vec<PassVerdict>> {
        self.gate()?;
        self.seen_filters
            .lock()
            .expect("mock filter log poisoned")
            .push(filter.to_string());
        Ok(items
            .iter()
            .filter(|it| {
                self.pass_ids
                    .as_ref()
                    .map(|ids| ids.contains(&it.id))
                    .unwrap_or(true)
            })
            .map(|it| PassVerdict {
                id: it.id.clone(),
                pass_reason: format!("mock gate hit for {}", it.id),
            })
            .collect())
    }
}
