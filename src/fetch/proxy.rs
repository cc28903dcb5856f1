// src/fetch/proxy.rs
//! Relay endpoints used to reach feeds that reject direct or cross-origin
//! requests. Tried in order; each strategy only wraps the feed URL.

use url::form_urlencoded::byte_serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStrategy {
    /// Usually reliable, returns the raw body.
    AllOrigins,
    /// Fast, direct proxy.
    CorsProxy,
    /// Good fallback.
    CodeTabs,
}

impl ProxyStrategy {
    pub const ORDERED: [ProxyStrategy; 3] = [
        ProxyStrategy::AllOrigins,
        ProxyStrategy::CorsProxy,
        ProxyStrategy::CodeTabs,
    ];

    pub fn wrap(&self, feed_url: &str) -> String {
        let encoded: String = byte_serialize(feed_url.as_bytes()).collect();
        match self {
            ProxyStrategy::AllOrigins => {
                format!("https://api.allorigins.win/raw?url={encoded}")
            }
            ProxyStrategy::CorsProxy => format!("https://corsproxy.io/?{encoded}"),
            ProxyStrategy::CodeTabs => {
                format!("https://api.codetabs.com/v1/proxy?quest={encoded}")
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProxyStrategy::AllOrigins => "allorigins",
            ProxyStrategy::CorsProxy => "corsproxy",
            ProxyStrategy::CodeTabs => "codetabs",
        }
    }
}
