//! Composite source scoring
//!
//! Combines learned base performance, context affinity, recency, and a
//! randomized exploration bonus into a single ranking score. Scoring never
//! mutates the metrics store; the total is used for relative order only and
//! is deliberately not clamped.

use crate::config::{ContextWeights, ExplorationConfig, RecencyConfig, SelectionConfig};
use crate::metrics::{SourceMetric, SourceMetricsStore};
use common::MarketContext;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Score breakdown for one candidate source in one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSource {
    pub source_id: String,
    pub base_score: f64,
    pub context_bonus: f64,
    pub recency_bonus: f64,
    pub exploration_bonus: f64,
    pub total_score: f64,
}

/// Scores candidate sources against the current market context.
#[derive(Debug, Clone)]
pub struct SourceScorer {
    weights: ContextWeights,
    recency: RecencyConfig,
    exploration: ExplorationConfig,
}

impl SourceScorer {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            weights: config.context_weights.clone(),
            recency: config.recency.clone(),
            exploration: config.exploration.clone(),
        }
    }

    /// Score every candidate, sorted descending by total score.
    ///
    /// Ties break on lexical source id so the ordering is deterministic
    /// under a seeded RNG.
    pub fn score(
        &self,
        sources: &[String],
        context: &MarketContext,
        store: &SourceMetricsStore,
        rng: &mut fastrand::Rng,
    ) -> Vec<ScoredSource> {
        let mut scored: Vec<ScoredSource> = sources
            .iter()
            .map(|id| self.score_one(id, context, store, rng))
            .collect();

        scored.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.source_id.cmp(&b.source_id))
        });

        scored
    }

    fn score_one(
        &self,
        source_id: &str,
        context: &MarketContext,
        store: &SourceMetricsStore,
        rng: &mut fastrand::Rng,
    ) -> ScoredSource {
        let neutral;
        let metric: &SourceMetric = match store.get(source_id) {
            Some(m) => m,
            None => {
                neutral = SourceMetric::neutral(source_id);
                &neutral
            }
        };

        let base_score = 0.5 * metric.success_rate + 0.5 * metric.signal_quality;
        let context_bonus = self.context_bonus(metric, context);

        let effective_cycles = metric.cycles_since_used.min(self.recency.cap_cycles);
        let recency_bonus = self.recency.increment * effective_cycles as f64;

        // One probability draw per source per cycle.
        let exploration_bonus = if rng.f64() < self.exploration.probability {
            rng.f64() * self.exploration.max_bonus
        } else {
            0.0
        };

        let total_score = base_score + context_bonus + recency_bonus + exploration_bonus;

        debug!(
            source = source_id,
            base = base_score,
            context = context_bonus,
            recency = recency_bonus,
            exploration = exploration_bonus,
            total = total_score,
            "Scored source"
        );

        ScoredSource {
            source_id: source_id.to_string(),
            base_score,
            context_bonus,
            recency_bonus,
            exploration_bonus,
            total_score,
        }
    }

    /// Independent additive boosts per context dimension; a dimension with
    /// no learned score contributes nothing.
    fn context_bonus(&self, metric: &SourceMetric, context: &MarketContext) -> f64 {
        let volatility = metric
            .context_score(&context.volatility_key())
            .map(|s| s * self.weights.volatility)
            .unwrap_or(0.0);
        let trend = metric
            .context_score(&context.trend_key())
            .map(|s| s * self.weights.trend)
            .unwrap_or(0.0);
        let session = metric
            .context_score(&context.session_key())
            .map(|s| s * self.weights.session)
            .unwrap_or(0.0);
        volatility + trend + session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{TradingSession, Trend, VolatilityTier};

    fn context() -> MarketContext {
        MarketContext {
            volatility: VolatilityTier::High,
            trend: Trend::Bullish,
            session: TradingSession::American,
        }
    }

    fn source_ids() -> Vec<String> {
        common::LOGICAL_SOURCES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_neutral_metrics_score_base_half() {
        // Probability 0 disables exploration entirely.
        let mut config = SelectionConfig::default();
        config.exploration.probability = 0.0;
        let scorer = SourceScorer::new(&config);
        let store = SourceMetricsStore::with_sources(common::LOGICAL_SOURCES);

        let mut rng = fastrand::Rng::with_seed(1);
        let scored = scorer.score(&source_ids(), &context(), &store, &mut rng);

        assert_eq!(scored.len(), 8);
        for s in &scored {
            assert_eq!(s.base_score, 0.5);
            assert_eq!(s.context_bonus, 0.0);
            assert_eq!(s.recency_bonus, 0.0);
            assert_eq!(s.exploration_bonus, 0.0);
            assert_eq!(s.total_score, 0.5);
        }
        // With identical totals, ordering falls back to lexical source id.
        let ids: Vec<&str> = scored.iter().map(|s| s.source_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_context_bonus_scales_by_weight() {
        let mut config = SelectionConfig::default();
        config.exploration.probability = 0.0;
        let scorer = SourceScorer::new(&config);

        let mut store = SourceMetricsStore::new();
        let metric = store.ensure("whaleMovements");
        metric.context_scores.insert("volatility:high".to_string(), 1.0);
        metric.context_scores.insert("trend:bullish".to_string(), 0.5);
        metric.context_scores.insert("session:american".to_string(), 1.0);

        let mut rng = fastrand::Rng::with_seed(1);
        let scored = scorer.score(
            &["whaleMovements".to_string()],
            &context(),
            &store,
            &mut rng,
        );

        // 1.0 * 0.4 + 0.5 * 0.2 + 1.0 * 0.3
        assert!((scored[0].context_bonus - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_recency_bonus_is_capped() {
        let mut config = SelectionConfig::default();
        config.exploration.probability = 0.0;
        let scorer = SourceScorer::new(&config);

        let mut store = SourceMetricsStore::new();
        store.ensure("newsNarratives").cycles_since_used = 40;

        let mut rng = fastrand::Rng::with_seed(1);
        let scored = scorer.score(
            &["newsNarratives".to_string()],
            &context(),
            &store,
            &mut rng,
        );

        // 0.05 * min(40, 10)
        assert!((scored[0].recency_bonus - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_under_seeded_rng() {
        let scorer = SourceScorer::new(&SelectionConfig::default());
        let store = SourceMetricsStore::with_sources(common::LOGICAL_SOURCES);

        let mut rng_a = fastrand::Rng::with_seed(42);
        let mut rng_b = fastrand::Rng::with_seed(42);
        let a = scorer.score(&source_ids(), &context(), &store, &mut rng_a);
        let b = scorer.score(&source_ids(), &context(), &store, &mut rng_b);

        let ids_a: Vec<&str> = a.iter().map(|s| s.source_id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|s| s.source_id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.total_score, y.total_score);
        }
    }

    #[test]
    fn test_scoring_does_not_mutate_store() {
        let scorer = SourceScorer::new(&SelectionConfig::default());
        let store = SourceMetricsStore::new();
        let mut rng = fastrand::Rng::with_seed(5);
        let scored = scorer.score(&source_ids(), &context(), &store, &mut rng);
        assert_eq!(scored.len(), 8);
        assert!(store.is_empty());
    }
}
