// src/sources.rs
//! Static feed registry and the rotating window the acquirer draws from.

use crate::types::FeedSource;

/// Feeds consulted per page.
pub const WINDOW_SIZE: usize = 5;

pub const REGISTRY: &[FeedSource] = &[
    FeedSource { name: "TechCrunch", url: "https://techcrunch.com/feed/" },
    FeedSource { name: "The Verge", url: "https://www.theverge.com/rss/index.xml" },
    FeedSource { name: "Wired", url: "https://www.wired.com/feed/rss" },
    FeedSource { name: "Ars Technica", url: "https://feeds.arstechnica.com/arstechnica/index" },
    FeedSource { name: "Engadget", url: "https://www.engadget.com/rss.xml" },
    FeedSource { name: "CNET", url: "https://www.cnet.com/rss/news/" },
    FeedSource { name: "VentureBeat", url: "https://venturebeat.com/feed/" },
    FeedSource { name: "ScienceAlert", url: "https://www.sciencealert.com/feed" },
    FeedSource { name: "MIT Tech Review", url: "https://www.technologyreview.com/feed/" },
    FeedSource { name: "IEEE Spectrum", url: "https://spectrum.ieee.org/rss/fulltext" },
    FeedSource { name: "Scientific American", url: "https://www.scientificamerican.com/section/news/rss/" },
    FeedSource { name: "Nature News", url: "https://www.nature.com/nature.rss" },
    FeedSource { name: "The Next Web", url: "https://thenextweb.com/feed" },
    FeedSource { name: "Mashable", url: "https://mashable.com/feed" },
    FeedSource { name: "Fast Company", url: "https://www.fastcompany.com/latest/rss" },
    FeedSource { name: "Business Insider", url: "https://www.businessinsider.com/rss" },
];

/// Registry indices a given page draws from: [`WINDOW_SIZE`] consecutive
/// entries starting at `(page * WINDOW_SIZE) % len`, wrapping around. A
/// registry smaller than the window yields each index once.
pub fn rotation_window(len: usize, page: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let start = (page * WINDOW_SIZE) % len;
    (0..WINDOW_SIZE.min(len)).map(|i| (start + i) % len).collect()
}
