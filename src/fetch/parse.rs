// src/fetch/parse.rs
//! Tolerant extraction of item-like nodes from RSS 2.0 and Atom documents.
//! Both shapes map onto one `Entry` struct; whichever root parses wins.

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{RadarError, Result};
use crate::types::RawItem;

/// Description cap after markup stripping.
const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

/// Superset of the RSS `<item>` and Atom `<entry>` children we care about.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Entry {
    title: Option<TextNode>,
    #[serde(rename = "link")]
    links: Vec<LinkNode>,
    description: Option<TextNode>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    // quick-xml strips the namespace prefix, so the element surfaces as the
    // local name `encoded` rather than `content:encoded`.
    #[serde(rename = "encoded")]
    content_encoded: Option<TextNode>,
    #[serde(rename = "media:description")]
    media_description: Option<TextNode>,
}

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// RSS links are element text; Atom links live in the `href` attribute.
#[derive(Debug, Default, Deserialize)]
struct LinkNode {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// Parse a feed body and extract up to `max_items` usable raw items.
/// Items lacking a title or link are dropped after the cap, so fewer than
/// `max_items` may come back even from a well-stocked feed.
pub fn extract_items(xml: &str, source_name: &str, max_items: usize) -> Result<Vec<RawItem>> {
    let scrubbed = scrub_entities(xml);

    let entries: Vec<Entry> = match from_str::<Rss>(&scrubbed) {
        Ok(rss) => rss.channel.items,
        Err(_) => from_str::<AtomFeed>(&scrubbed)
            .map(|feed| feed.entries)
            .map_err(|e| RadarError::FeedParse(e.to_string()))?,
    };

    let items = entries
        .into_iter()
        .take(max_items)
        .filter_map(|entry| raw_item_from(entry, source_name))
        .collect();
    Ok(items)
}

fn raw_item_from(entry: Entry, source_name: &str) -> Option<RawItem> {
    let title = entry
        .title
        .and_then(|t| t.value)
        .map(|t| collapse_whitespace(&t))
        .filter(|t| !t.is_empty())?;
    let link = pick_link(&entry.links)?;

    // Several sibling tag names can carry the body text; first hit wins.
    let description = [
        entry.description,
        entry.summary,
        entry.content,
        entry.content_encoded,
        entry.media_description,
    ]
    .into_iter()
    .flatten()
    .find_map(|n| n.value)
    .unwrap_or_default();

    Some(RawItem {
        source_name: source_name.to_string(),
        title,
        description: clean_description(&description),
        link,
    })
}

fn pick_link(links: &[LinkNode]) -> Option<String> {
    // Element text first (RSS), then an alternate/unmarked href, then any
    // href at all (Atom feeds often list self/hub links too).
    let by_text = links
        .iter()
        .find_map(|l| l.value.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(text) = by_text {
        return Some(text.to_string());
    }
    let alternate = links
        .iter()
        .filter(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .find_map(|l| l.href.as_deref());
    alternate
        .or_else(|| links.iter().find_map(|l| l.href.as_deref()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Strip CDATA wrappers and markup, decode entities, collapse whitespace,
/// cap the length.
pub fn clean_description(raw: &str) -> String {
    static RE_CDATA: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_cdata = RE_CDATA.get_or_init(|| regex::Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
    let unwrapped = re_cdata.replace_all(raw, "$1");

    let decoded = html_escape::decode_html_entities(&unwrapped).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]*>?").unwrap());
    let stripped = re_tags.replace_all(&decoded, " ");

    let collapsed = collapse_whitespace(&stripped);
    if collapsed.chars().count() > DESCRIPTION_MAX_CHARS {
        collapsed.chars().take(DESCRIPTION_MAX_CHARS).collect()
    } else {
        collapsed
    }
}

fn collapse_whitespace(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Bare HTML entities inside otherwise-valid XML trip the parser; swap the
/// usual suspects before handing the body to quick-xml.
fn scrub_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
