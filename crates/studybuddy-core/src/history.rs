use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Summaries remembered per session
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryEntry {
    pub url: String,
    /// Host of `url`, shown as the entry title
    pub title: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl SummaryEntry {
    pub fn new(url: &str, summary: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            title: host_of(url),
            summary: summary.into(),
            created_at: Utc::now(),
        }
    }
}

fn host_of(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = host.rsplit('@').next().unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// Most recent summaries, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryHistory {
    entries: VecDeque<SummaryEntry>,
}

impl SummaryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: SummaryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn entries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
