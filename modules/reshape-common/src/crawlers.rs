//! AI and search crawler detection plus per-crawler visit statistics.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{ReshapeError, Result};

/// User-agent tokens, checked in order. The first match wins.
pub const CRAWLER_PATTERNS: &[&str] = &[
    // OpenAI
    "GPTBot",
    "ChatGPT-User",
    // Google
    "Google-Extended",
    "Googlebot",
    // Anthropic
    "anthropic-ai",
    "Claude-Web",
    // Microsoft
    "bingbot",
    "BingPreview",
    "PerplexityBot",
    // Common Crawl
    "CCBot",
    "CommonCrawl",
    // Meta
    "FacebookBot",
    "facebookexternalhit",
    "Bytespider",
    "Applebot",
    "YandexBot",
    "DuckDuckBot",
    // SEO tools
    "SemrushBot",
    "AhrefsBot",
    "DataForSeoBot",
];

pub struct CrawlerDetector {
    patterns: Vec<Regex>,
}

impl CrawlerDetector {
    pub fn new() -> Self {
        let patterns = CRAWLER_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(&format!("(?i){}", regex::escape(p))).ok())
            .collect();
        Self { patterns }
    }

    /// The matched user-agent text (as written by the client), if any pattern hits.
    pub fn detect(&self, user_agent: &str) -> Option<String> {
        self.patterns
            .iter()
            .find_map(|p| p.find(user_agent))
            .map(|m| m.as_str().to_string())
    }

    pub fn patterns(&self) -> &'static [&'static str] {
        CRAWLER_PATTERNS
    }
}

impl Default for CrawlerDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerStat {
    pub count: u64,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerSummary {
    pub total_crawlers: usize,
    pub total_visits: u64,
    pub crawlers: BTreeMap<String, CrawlerStat>,
}

#[async_trait]
pub trait CrawlerStatsStore: Send + Sync {
    async fn record(&self, crawler: &str, seen_at: DateTime<Utc>) -> Result<()>;
    async fn snapshot(&self) -> Result<CrawlerSummary>;
}

#[derive(Default)]
pub struct MemoryCrawlerStats {
    stats: Mutex<BTreeMap<String, CrawlerStat>>,
}

impl MemoryCrawlerStats {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrawlerStatsStore for MemoryCrawlerStats {
    async fn record(&self, crawler: &str, seen_at: DateTime<Utc>) -> Result<()> {
        let mut stats = self
            .stats
            .lock()
            .map_err(|_| ReshapeError::Storage("crawler stats poisoned".to_string()))?;
        stats
            .entry(crawler.to_string())
            .and_modify(|s| {
                s.count += 1;
                s.last_seen = seen_at;
            })
            .or_insert(CrawlerStat {
                count: 1,
                last_seen: seen_at,
            });
        Ok(())
    }

    async fn snapshot(&self) -> Result<CrawlerSummary> {
        let stats = self
            .stats
            .lock()
            .map_err(|_| ReshapeError::Storage("crawler stats poisoned".to_string()))?;
        Ok(CrawlerSummary {
            total_crawlers: stats.len(),
            total_visits: stats.values().map(|s| s.count).sum(),
            crawlers: stats.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn detects_known_crawlers() {
        let d = CrawlerDetector::new();
        assert_eq!(
            d.detect("Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.1; +https://openai.com/gptbot)")
                .as_deref(),
            Some("GPTBot")
        );
        assert_eq!(
            d.detect("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)")
                .as_deref(),
            Some("Googlebot")
        );
    }

    #[test]
    fn match_is_case_insensitive_and_keeps_client_text() {
        let d = CrawlerDetector::new();
        assert_eq!(d.detect("some ccbot/2.0").as_deref(), Some("ccbot"));
    }

    #[test]
    fn earlier_patterns_win() {
        let d = CrawlerDetector::new();
        assert_eq!(
            d.detect("Googlebot Google-Extended").as_deref(),
            Some("Google-Extended")
        );
    }

    #[test]
    fn browsers_are_not_crawlers() {
        let d = CrawlerDetector::new();
        assert_eq!(
            d.detect("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 Safari/605.1.15"),
            None
        );
        assert_eq!(d.patterns().len(), 20);
    }

    #[tokio::test]
    async fn stats_accumulate() {
        let store = MemoryCrawlerStats::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(5);
        store.record("GPTBot", t0).await.unwrap();
        store.record("GPTBot", t1).await.unwrap();
        store.record("CCBot", t0).await.unwrap();

        let summary = store.snapshot().await.unwrap();
        assert_eq!(summary.total_crawlers, 2);
        assert_eq!(summary.total_visits, 3);
        assert_eq!(summary.crawlers["GPTBot"].count, 2);
        assert_eq!(summary.crawlers["GPTBot"].last_seen, t1);
    }
}
