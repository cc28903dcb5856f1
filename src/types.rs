// src/types.rs
use serde::{Deserialize, Serialize};

/// One feed endpoint from the static registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedSource {
    pub name: &'static str,
    pub url: &'static str,
}

/// Item as extracted from feed XML, before enrichment. Discarded once the
/// model has produced the corresponding [`NewsItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub source_name: String,
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Enriched item: translated, summarized and categorized. Immutable once
/// created; `id` is session-unique and serves as the dedup key everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub source: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub link: String,
}

/// An item that passed the active filter, carrying the model's short
/// justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredNewsItem {
    #[serde(flatten)]
    pub item: NewsItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Like,
    Dislike,
}

/// A cast vote bound to a snapshot of the item it judged. Retracting a vote
/// removes the record entirely; there is no stored "none".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub item_id: String,
    pub item: NewsItem,
    pub vote: Vote,
}

/// Output of profile synthesis. The filter text is an opaque policy
/// document; the pipeline stores and forwards it verbatim, never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub persona: String,
    pub natural_language_filter: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
