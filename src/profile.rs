// src/profile.rs
//! Profile synthesis from vote history, and persistence of the active
//! filter between sessions.

use std::path::{Path, PathBuf};
use std::{env, fs};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::enrich::EnrichmentClient;
use crate::error::{RadarError, Result};
use crate::prefs::{PreferenceStore, MIN_VOTES_FOR_SYNTHESIS};
use crate::types::{AnalysisResult, Vote, VoteRecord};

pub const ENV_PROFILE_PATH: &str = "RADAR_PROFILE_PATH";
const DEFAULT_PROFILE_PATH: &str = "config/profile.json";

/// Reduce the vote set to the compact representation the synthesizer sees:
/// one "[category] title" line per vote, split by direction.
pub fn partition_votes(votes: &[VoteRecord]) -> (Vec<String>, Vec<String>) {
    let mut likes = Vec::new();
    let mut dislikes = Vec::new();
    for record in votes {
        let line = format!("[{}] {}", record.item.category, record.item.title);
        match record.vote {
            Vote::Like => likes.push(line),
            Vote::Dislike => dislikes.push(line),
        }
    }
    (likes, dislikes)
}

/// Single blocking synthesis call, gated on the vote minimum. A shape
/// mismatch here is terminal for the operation; there is nothing to fall
/// back to.
pub async fn synthesize_profile(
    prefs: &PreferenceStore,
    client: &dyn EnrichmentClient,
) -> Result<AnalysisResult> {
    let have = prefs.count();
    if have < MIN_VOTES_FOR_SYNTHESIS {
        return Err(RadarError::NotEnoughVotes { have, min: MIN_VOTES_FOR_SYNTHESIS });
    }

    let votes = prefs.snapshot();
    let (likes, dislikes) = partition_votes(&votes);
    info!(likes = likes.len(), dislikes = dislikes.len(), "synthesizing preference profile");
    client.synthesize_profile(&likes, &dislikes).await
}

/// The active profile as persisted between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub persona: String,
    pub natural_language_filter: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl StoredProfile {
    pub fn from_analysis(result: &AnalysisResult) -> Self {
        Self {
            persona: result.persona.clone(),
            natural_language_filter: result.natural_language_filter.clone(),
            tags: result.tags.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Downloadable plaintext rendition of the profile.
    pub fn export_blob(&self) -> String {
        format!(
            "User Persona:\n{}\n\nNatural Language Filter:\n{}",
            self.persona, self.natural_language_filter
        )
    }
}

/// JSON-file persistence for the single active profile.
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$RADAR_PROFILE_PATH` or the default location.
    pub fn from_env() -> Self {
        let path = env::var(ENV_PROFILE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_PATH));
        Self::at(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<StoredProfile> {
        let data = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&data) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stored profile unreadable");
                None
            }
        }
    }

    pub fn save(&self, profile: &StoredProfile) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(profile).unwrap_or_else(|_| "{}".to_string());
        fs::write(&tmp, json)?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }
}
