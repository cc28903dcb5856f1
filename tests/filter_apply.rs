// tests/filter_apply.rs
//
// Filter applier contract: closed-world intersection in original order,
// reasons attached, the policy string forwarded byte-identically, and
// errors propagated whole.

use std::sync::Arc;

use news_radar::enrich::MockEnrichment;
use news_radar::filter::FilterApplier;
use news_radar::types::NewsItem;
use news_radar::RadarError;

fn item(n: usize) -> NewsItem {
    NewsItem {
        id: format!("news-0-{n}"),
        source: "Stub".to_string(),
        title: format!("story {n}"),
        summary: format!("summary {n}"),
        category: "Dev".to_string(),
        link: format!("https://stub.example/{n}"),
    }
}

#[tokio::test]
async fn unnamed_items_are_rejected_and_order_is_preserved() {
    let items: Vec<NewsItem> = (0..5).map(item).collect();
    let mock = Arc::new(MockEnrichment::passing_only(["news-0-1", "news-0-3"]));
    let applier = FilterApplier::new(mock);

    let passed = applier.apply(&items, "strict policy").await.unwrap();

    assert_eq!(passed.len(), 2);
    assert_eq!(passed[0].item.id, "news-0-1");
    assert_eq!(passed[1].item.id, "news-0-3");
    assert!(passed.iter().all(|p| p.pass_reason.as_deref().is_some_and(|r| !r.is_empty())));
}

#[tokio::test]
async fn nothing_named_means_everything_rejected() {
    let items: Vec<NewsItem> = (0..3).map(item).collect();
    let mock = Arc::new(MockEnrichment::passing_only(Vec::<String>::new()));
    let applier = FilterApplier::new(mock);

    let passed = applier.apply(&items, "blocks all").await.unwrap();
    assert!(passed.is_empty());
}

#[tokio::test]
async fn empty_input_skips_the_collaborator_entirely() {
    let mock = Arc::new(MockEnrichment::passing_all());
    let applier = FilterApplier::new(mock.clone());

    let passed = applier.apply(&[], "whatever").await.unwrap();
    assert!(passed.is_empty());
    assert!(mock.seen_filters.lock().unwrap().is_empty());
}

#[tokio::test]
async fn policy_string_survives_transit_byte_identically() {
    let nlf = "[ROLE DEFINITION] 过滤器\n[PASS_GATES]\tkernel internals 🚀\r\n[BLOCK_GATES] “soft” PR pieces";
    let items: Vec<NewsItem> = (0..2).map(item).collect();
    let mock = Arc::new(MockEnrichment::passing_all());
    let applier = FilterApplier::new(mock.clone());

    applier.apply(&items, nlf).await.unwrap();
    applier.apply(&items, nlf).await.unwrap();

    let seen = mock.seen_filters.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for received in seen.iter() {
        assert_eq!(received.as_bytes(), nlf.as_bytes());
    }
}

#[tokio::test]
async fn collaborator_errors_propagate_whole() {
    let items: Vec<NewsItem> = (0..2).map(item).collect();
    let applier = FilterApplier::new(Arc::new(MockEnrichment::quota_exhausted()));

    let err = applier.apply(&items, "any").await.unwrap_err();
    assert!(matches!(err, RadarError::QuotaExceeded));
}
