// tests/profile_synth.rs
//
// Vote partitioning into the compact synthesis representation, profile
// persistence round trips, and the plaintext export shape.

use news_radar::profile::{partition_votes, ProfileStore, StoredProfile};
use news_radar::types::{AnalysisResult, NewsItem, Vote, VoteRecord};

fn record(n: usize, category: &str, title: &str, vote: Vote) -> VoteRecord {
    let item = NewsItem {
        id: format!("news-0-{n}"),
        source: "Stub".to_string(),
        title: title.to_string(),
        summary: "summary".to_string(),
        category: category.to_string(),
        link: format!("https://stub.example/{n}"),
    };
    VoteRecord { item_id: item.id.clone(), item, vote }
}

#[test]
fn votes_partition_into_bracketed_category_lines() {
    let votes = vec![
        record(0, "AI", "Transformer inference on a toaster", Vote::Like),
        record(1, "Business", "Startup raises round", Vote::Dislike),
        record(2, "Dev", "Borrow checker deep dive", Vote::Like),
    ];

    let (likes, dislikes) = partition_votes(&votes);
    assert_eq!(
        likes,
        vec![
            "[AI] Transformer inference on a toaster".to_string(),
            "[Dev] Borrow checker deep dive".to_string(),
        ]
    );
    assert_eq!(dislikes, vec!["[Business] Startup raises round".to_string()]);
}

#[test]
fn stored_profile_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::at(dir.path().join("profile.json"));

    assert!(store.load().is_none(), "fresh store has no profile");

    let analysis = AnalysisResult {
        persona: "Systems-minded reader.".to_string(),
        natural_language_filter: "[ROLE DEFINITION] ruthless gate".to_string(),
        tags: vec!["#systems".to_string(), "#hardcore".to_string()],
    };
    let profile = StoredProfile::from_analysis(&analysis);
    store.save(&profile).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, profile);
    assert_eq!(loaded.natural_language_filter, analysis.natural_language_filter);
}

#[test]
fn saving_twice_keeps_only_the_latest_profile() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::at(dir.path().join("profile.json"));

    let first = StoredProfile::from_analysis(&AnalysisResult {
        persona: "v1".into(),
        natural_language_filter: "filter v1".into(),
        tags: vec![],
    });
    let second = StoredProfile::from_analysis(&AnalysisResult {
        persona: "v2".into(),
        natural_language_filter: "filter v2".into(),
        tags: vec![],
    });
    store.save(&first).unwrap();
    store.save(&second).unwrap();

    assert_eq!(store.load().unwrap().natural_language_filter, "filter v2");
}

#[test]
fn export_blob_concatenates_persona_and_filter() {
    let profile = StoredProfile::from_analysis(&AnalysisResult {
        persona: "Curious engineer.".to_string(),
        natural_language_filter: "[PASS_GATES] depth".to_string(),
        tags: vec![],
    });

    let blob = profile.export_blob();
    assert!(blob.starts_with("User Persona:\nCurious engineer."));
    assert!(blob.contains("\n\nNatural Language Filter:\n[PASS_GATES] depth"));
}

#[test]
fn garbled_profile_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = ProfileStore::at(path);
    assert!(store.load().is_none());
}
