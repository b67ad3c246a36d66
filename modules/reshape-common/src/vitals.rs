//! Web Vitals samples: classification, storage interface and aggregation.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReshapeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metric {
    Cls,
    Inp,
    Lcp,
    Fcp,
    Ttfb,
}

impl Metric {
    pub const ALL: [Metric; 5] = [Metric::Cls, Metric::Inp, Metric::Lcp, Metric::Fcp, Metric::Ttfb];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cls => "CLS",
            Metric::Inp => "INP",
            Metric::Lcp => "LCP",
            Metric::Fcp => "FCP",
            Metric::Ttfb => "TTFB",
        }
    }

    /// Exact, upper-case name as reported by the browser.
    pub fn parse(value: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// (good below, poor at or above)
    fn thresholds(self) -> (f64, f64) {
        match self {
            Metric::Cls => (0.1, 0.25),
            Metric::Inp => (200.0, 500.0),
            Metric::Lcp => (2500.0, 4000.0),
            Metric::Fcp => (1800.0, 3000.0),
            Metric::Ttfb => (800.0, 1800.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl Rating {
    pub fn classify(metric: Metric, value: f64) -> Rating {
        let (good, poor) = metric.thresholds();
        if value < good {
            Rating::Good
        } else if value < poor {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }
}

/// A sample as posted by the browser. Rating and timestamp are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsReport {
    pub metric: Metric,
    pub value: f64,
    pub rating: Option<Rating>,
    pub delta: Option<f64>,
    pub id: Option<String>,
    pub navigation_type: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl VitalsReport {
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<VitalsEntry> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(ReshapeError::Validation(format!(
                "{} value must be a non-negative number",
                self.metric.as_str()
            )));
        }
        Ok(VitalsEntry {
            rating: self
                .rating
                .unwrap_or_else(|| Rating::classify(self.metric, self.value)),
            timestamp: self.timestamp.unwrap_or(now),
            metric: self.metric,
            value: self.value,
            delta: self.delta,
            id: self.id,
            navigation_type: self.navigation_type,
            url: self.url,
            user_agent: self.user_agent,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsEntry {
    pub metric: Metric,
    pub value: f64,
    pub rating: Rating,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    OneHour,
    Day,
    Week,
    Month,
}

impl TimeRange {
    /// `1h`, `24h`, `7d` or `30d`.
    pub fn parse(value: &str) -> Option<TimeRange> {
        match value {
            "1h" => Some(TimeRange::OneHour),
            "24h" => Some(TimeRange::Day),
            "7d" => Some(TimeRange::Week),
            "30d" => Some(TimeRange::Month),
            _ => None,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            TimeRange::OneHour => Duration::hours(1),
            TimeRange::Day => Duration::hours(24),
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VitalsFilter {
    pub metric: Option<Metric>,
    /// Only entries strictly newer than this.
    pub since: Option<DateTime<Utc>>,
}

impl VitalsFilter {
    pub fn matches(&self, entry: &VitalsEntry) -> bool {
        self.metric.map_or(true, |m| m == entry.metric)
            && self.since.map_or(true, |since| entry.timestamp > since)
    }
}

/// Storage for vitals samples. Implementations decide retention; `query` returns
/// matching entries oldest first.
#[async_trait]
pub trait VitalsStore: Send + Sync {
    async fn record(&self, entry: VitalsEntry) -> Result<()>;
    async fn query(&self, filter: &VitalsFilter) -> Result<Vec<VitalsEntry>>;
}

/// Fixed-capacity buffer. When full, the oldest entry is dropped.
pub struct MemoryVitalsStore {
    capacity: usize,
    entries: Mutex<VecDeque<VitalsEntry>>,
}

impl MemoryVitalsStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[async_trait]
impl VitalsStore for MemoryVitalsStore {
    async fn record(&self, entry: VitalsEntry) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ReshapeError::Storage("vitals buffer poisoned".to_string()))?;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        Ok(())
    }

    async fn query(&self, filter: &VitalsFilter) -> Result<Vec<VitalsEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ReshapeError::Storage("vitals buffer poisoned".to_string()))?;
        Ok(entries.iter().filter(|e| filter.matches(e)).cloned().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingCounts {
    pub good: usize,
    pub needs_improvement: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub ratings: RatingCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsSummary {
    pub time_range: String,
    pub total_entries: usize,
    pub metrics: BTreeMap<Metric, MetricSummary>,
    pub recent_entries: Vec<VitalsEntry>,
}

pub const RECENT_ENTRIES: usize = 10;

/// Value at index `floor(n * p)` of an ascending slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64) * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn summarize_metric(entries: &[&VitalsEntry]) -> Option<MetricSummary> {
    if entries.is_empty() {
        return None;
    }
    let mut values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let mut ratings = RatingCounts::default();
    for entry in entries {
        match entry.rating {
            Rating::Good => ratings.good += 1,
            Rating::NeedsImprovement => ratings.needs_improvement += 1,
            Rating::Poor => ratings.poor += 1,
        }
    }

    Some(MetricSummary {
        count: values.len(),
        average: values.iter().sum::<f64>() / values.len() as f64,
        median: values[values.len() / 2],
        p75: percentile(&values, 0.75),
        p95: percentile(&values, 0.95),
        ratings,
    })
}

/// Per-metric aggregates plus the most recent entries, newest first.
/// `entries` must be oldest first, as returned by [`VitalsStore::query`].
pub fn summarize(time_range: &str, entries: &[VitalsEntry]) -> VitalsSummary {
    let mut metrics = BTreeMap::new();
    for metric in Metric::ALL {
        let of_metric: Vec<&VitalsEntry> = entries.iter().filter(|e| e.metric == metric).collect();
        if let Some(summary) = summarize_metric(&of_metric) {
            metrics.insert(metric, summary);
        }
    }

    VitalsSummary {
        time_range: time_range.to_string(),
        total_entries: entries.len(),
        metrics,
        recent_entries: entries.iter().rev().take(RECENT_ENTRIES).cloned().collect(),
    }
}
