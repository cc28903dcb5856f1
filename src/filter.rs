// src/filter.rs
//! Applies the active natural-language filter to enriched items.

use std::collections::HashMap;

use metrics::counter;
use tracing::debug;

use crate::enrich::{DynEnrichment, FilterProjection};
use crate::error::Result;
use crate::types::{FilteredNewsItem, NewsItem};

pub struct FilterApplier {
    client: DynEnrichment,
}

impl FilterApplier {
    pub fn new(client: DynEnrichment) -> Self {
        Self { client }
    }

    /// Closed-world judgement: items the model does not name are rejected.
    /// Survivors keep their original relative order and carry the model's
    /// pass reason. Either the whole list comes back or the error
    /// propagates; there is no partial result.
    pub async fn apply(&self, items: &[NewsItem], filter: &str) -> Result<Vec<FilteredNewsItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let projection: Vec<FilterProjection> = items
            .iter()
            .map(|n| FilterProjection {
                id: n.id.clone(),
                title: n.title.clone(),
                summary: n.summary.clone(),
            })
            .collect();

        let verdicts = self.client.filter_items(&projection, filter).await?;
        let reasons: HashMap<&str, &str> = verdicts
            .iter()
            .map(|v| (v.id.as_str(), v.pass_reason.as_str()))
            .collect();

        let passed: Vec<FilteredNewsItem> = items
            .iter()
            .filter_map(|item| {
                reasons.get(item.id.as_str()).map(|reason| FilteredNewsItem {
                    item: item.clone(),
                    pass_reason: Some(reason.to_string()),
                })
            })
            .collect();

        counter!("filter_pass_total").increment(passed.len() as u64);
        counter!("filter_reject_total").increment((items.len() - passed.len()) as u64);
        debug!(input = items.len(), passed = passed.len(), "filter applied");
        Ok(passed)
    }
}
