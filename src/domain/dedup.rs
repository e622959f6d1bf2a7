// src/domain/dedup.rs

use std::collections::HashSet;

/// Exact plain-text match against previously emitted alerts.
/// Two events that render the same text collide; that's intended.
pub fn is_duplicate(text: &str, recent_alerts: &HashSet<String>) -> bool {
    recent_alerts.contains(text)
}

/// The dedup window for one cycle, seeded from the alert log.
#[derive(Debug, Default)]
pub struct DedupFilter {
    recent: HashSet<String>,
}

impl DedupFilter {
    pub fn new<I>(alerts: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            recent: alerts.into_iter().collect(),
        }
    }

    pub fn is_duplicate(&self, text: &str) -> bool {
        is_duplicate(text, &self.recent)
    }

    /// Records an alert emitted during the current cycle.
    pub fn remember(&mut self, text: &str) {
        self.recent.insert(text.to_string());
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }
}
