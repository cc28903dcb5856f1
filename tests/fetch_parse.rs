// tests/fetch_parse.rs
//
// Feed extraction against hand-rolled RSS 2.0 and Atom fixtures:
// - item cap applies before usability filtering
// - items without a usable title or link are dropped
// - CDATA wrappers and markup are stripped, whitespace collapsed, length capped
// - Atom links come from the alternate href

use news_radar::fetch::parse::extract_items;
use news_radar::fetch::MAX_ITEMS_PER_FEED;

const RSS_XML: &str = include_str!("fixtures/sample_rss.xml");
const ATOM_XML: &str = include_str!("fixtures/sample_atom.xml");

#[test]
fn rss_fixture_caps_then_drops_unusable_items() {
    let items = extract_items(RSS_XML, "Fixture Wire", MAX_ITEMS_PER_FEED).unwrap();

    // 7 items in the document; the cap keeps the first 5, of which two lack
    // a title or link.
    assert_eq!(items.len(), 3);
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Quantum chip clears error-correction milestone",
            "Battery startup claims 500-mile pack",
            "Open-source kernel scheduler merged",
        ]
    );
    assert!(items.iter().all(|i| i.source_name == "Fixture Wire"));
}

#[test]
fn rss_descriptions_are_cleaned_and_capped() {
    let items = extract_items(RSS_XML, "Fixture Wire", MAX_ITEMS_PER_FEED).unwrap();

    let quantum = &items[0];
    assert!(!quantum.description.contains('<'), "markup must be stripped");
    assert!(!quantum.description.contains("CDATA"));
    assert!(quantum.description.contains("logical qubit"));

    let battery = &items[1];
    assert!(battery.description.chars().count() <= 500);

    // content:encoded serves as the description fallback.
    let sched = &items[2];
    assert!(sched.description.contains("swapped at runtime"));
    assert!(!sched.description.contains("<em>"));
}

#[test]
fn atom_fixture_parses_entries_with_href_links() {
    let items = extract_items(ATOM_XML, "Atom Stream", MAX_ITEMS_PER_FEED).unwrap();

    assert_eq!(items.len(), 3);
    // rel="self" must lose to rel="alternate".
    assert_eq!(items[0].link, "https://fixture.example/atom/interstellar");
    assert_eq!(items[1].link, "https://fixture.example/atom/rust-embedded");
    assert!(items[0].description.contains("carbon-rich crust"));
    // Escaped markup inside <content> decodes and strips away.
    assert!(items[1].description.contains("first-party"));
    assert!(!items[1].description.contains("<b>"));
}

#[test]
fn smaller_cap_limits_extraction() {
    let items = extract_items(RSS_XML, "Fixture Wire", 2).unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn non_xml_body_is_a_parse_error() {
    let err = extract_items("definitely not xml", "X", 5).unwrap_err();
    assert!(matches!(err, news_radar::RadarError::FeedParse(_)));
}
