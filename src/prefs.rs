// src/prefs.rs
//! In-memory vote records backing profile synthesis.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::{NewsItem, Vote, VoteRecord};

/// Votes required before profile synthesis is allowed.
pub const MIN_VOTES_FOR_SYNTHESIS: usize = 10;

#[derive(Debug, Default)]
pub struct PreferenceStore {
    inner: Mutex<HashMap<String, VoteRecord>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert semantics: `None` retracts any existing vote for the id;
    /// like/dislike replaces or inserts a record binding the id to a
    /// snapshot of the full item.
    pub fn record_vote(&self, item_id: &str, item: NewsItem, vote: Option<Vote>) {
        let mut map = self.inner.lock().expect("prefs mutex poisoned");
        match vote {
            None => {
                map.remove(item_id);
            }
            Some(v) => {
                map.insert(
                    item_id.to_string(),
                    VoteRecord { item_id: item_id.to_string(), item, vote: v },
                );
            }
        }
    }

    pub fn count(&self) -> usize {
        self.inner.lock().expect("prefs mutex poisoned").len()
    }

    /// (likes, dislikes)
    pub fn tally(&self) -> (usize, usize) {
        let map = self.inner.lock().expect("prefs mutex poisoned");
        let likes = map.values().filter(|r| r.vote == Vote::Like).count();
        (likes, map.len() - likes)
    }

    /// Current record set, ordered by item id for stable downstream prompts.
    pub fn snapshot(&self) -> Vec<VoteRecord> {
        let map = self.inner.lock().expect("prefs mutex poisoned");
        let mut records: Vec<VoteRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        records
    }

    pub fn clear(&self) {
        self.inner.lock().expect("prefs mutex poisoned").clear();
    }
}
