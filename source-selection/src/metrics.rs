//! Per-source learned statistics

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Learned statistics for one logical source.
///
/// Invariant: `success_rate`, `signal_quality`, and every entry of
/// `context_scores` stay within [0, 1]; the learner clamps after each
/// update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetric {
    pub source_id: String,
    /// EMA of query success.
    pub success_rate: f64,
    /// EMA of whether the source's data contributed to an emitted signal.
    pub signal_quality: f64,
    /// Sparse per-context performance, keyed by e.g. `volatility:high`.
    pub context_scores: HashMap<String, f64>,
    /// Cycles since this source was last selected.
    pub cycles_since_used: u32,
}

impl SourceMetric {
    /// Neutral starting point used on first reference.
    pub fn neutral(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            success_rate: 0.5,
            signal_quality: 0.5,
            context_scores: HashMap::new(),
            cycles_since_used: 0,
        }
    }

    pub fn context_score(&self, key: &str) -> Option<f64> {
        self.context_scores.get(key).copied()
    }
}

/// Owner of all [`SourceMetric`] state for one agent instance.
///
/// Passed by reference into the scorer (read-only) and the learner
/// (exclusive mutation); the orchestrator owns its lifetime, so no internal
/// locking is needed for a single-agent deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetricsStore {
    metrics: HashMap<String, SourceMetric>,
}

impl SourceMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize every candidate up front so recency counters accumulate
    /// from the first cycle.
    pub fn with_sources<'a, I: IntoIterator<Item = &'a str>>(source_ids: I) -> Self {
        let mut store = Self::new();
        for id in source_ids {
            store.ensure(id);
        }
        store
    }

    pub fn get(&self, source_id: &str) -> Option<&SourceMetric> {
        self.metrics.get(source_id)
    }

    /// Fetch the metric, initializing it to neutral defaults on first
    /// reference.
    pub fn ensure(&mut self, source_id: &str) -> &mut SourceMetric {
        self.metrics
            .entry(source_id.to_string())
            .or_insert_with(|| SourceMetric::neutral(source_id))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceMetric> {
        self.metrics.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceMetric> {
        self.metrics.values()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
