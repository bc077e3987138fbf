//! Adaptive learning over query outcomes
//!
//! Closes the feedback loop: after each cycle the learner folds observed
//! success and signal contribution back into the metrics store with an
//! exponential moving average, so the next cycle's scoring reflects what
//! just happened. This is the only component that mutates the store, and it
//! never fails: it operates on in-memory state already validated upstream.

use crate::metrics::SourceMetricsStore;
use common::{MarketContext, QueryOutcome, Signal};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// EMA update rule: `new = (1 - α) * old + α * observation`, clamped.
fn ema(old: f64, observation: f64, alpha: f64) -> f64 {
    ((1.0 - alpha) * old + alpha * observation).clamp(0.0, 1.0)
}

/// Updates per-source statistics from a cycle's outcomes.
#[derive(Debug, Clone)]
pub struct AdaptiveLearner {
    learning_rate: f64,
}

impl AdaptiveLearner {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Fold this cycle's outcomes into the store.
    ///
    /// Selected sources with no outcome entry (dispatcher timeout or
    /// cancellation) are treated as failed queries, so the learning loop
    /// never stalls on a partial cycle.
    pub fn update(
        &self,
        store: &mut SourceMetricsStore,
        outcomes: &HashMap<String, QueryOutcome>,
        signals: &[Signal],
        context: &MarketContext,
        selected: &[String],
    ) {
        let alpha = self.learning_rate;

        let contributing: HashSet<&str> = signals.iter().map(|s| s.source.as_str()).collect();
        let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();

        for source_id in selected {
            let observed_success = match outcomes.get(source_id) {
                Some(outcome) if outcome.success => 1.0,
                _ => 0.0,
            };
            let observed_quality = if contributing.contains(source_id.as_str()) {
                1.0
            } else {
                0.0
            };
            let combined = 0.5 * observed_success + 0.5 * observed_quality;

            let metric = store.ensure(source_id);
            metric.success_rate = ema(metric.success_rate, observed_success, alpha);
            metric.signal_quality = ema(metric.signal_quality, observed_quality, alpha);

            for key in [
                context.volatility_key(),
                context.trend_key(),
                context.session_key(),
            ] {
                let entry = metric.context_scores.entry(key).or_insert(0.5);
                *entry = ema(*entry, combined, alpha);
            }

            metric.cycles_since_used = 0;

            debug!(
                source = source_id.as_str(),
                success_rate = metric.success_rate,
                signal_quality = metric.signal_quality,
                observed_success,
                observed_quality,
                "Updated source metrics"
            );
        }

        for metric in store.iter_mut() {
            if !selected_set.contains(metric.source_id.as_str()) {
                metric.cycles_since_used += 1;
            }
        }
    }
}
