//! The per-cycle control flow
//!
//! assess -> score -> select -> dispatch -> generate -> learn. Context
//! assessment failure aborts the cycle before any state changes; dispatcher
//! failures degrade to partial outcomes and the learner always runs.

use crate::config::AgentConfig;
use crate::dispatcher::QueryDispatcher;
use anyhow::Result;
use chrono::{DateTime, Utc};
use common::{ContextAssessor, MarketContext, PriceSnapshot, QueryOutcome, Signal};
use serde::{Deserialize, Serialize};
use signal_generation::SignalGenerator;
use source_selection::{
    AdaptiveLearner, ScoredSource, SourceMetricsStore, SourceScorer, SourceSelector,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

/// Per-source outcome summary embedded in the cycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub success: bool,
    pub latency_ms: u64,
}

/// Everything the persistence collaborator needs about one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle: u64,
    pub started_at: DateTime<Utc>,
    pub context: MarketContext,
    pub scored_sources: Vec<ScoredSource>,
    pub selected: Vec<String>,
    pub outcomes_summary: HashMap<String, OutcomeSummary>,
    pub signals: Vec<Signal>,
    pub metrics_snapshot: SourceMetricsStore,
}

/// Owns the metrics store and drives one full cycle at a time.
pub struct CycleEngine {
    sources: Vec<String>,
    query_timeout: Duration,
    assessor: ContextAssessor,
    scorer: SourceScorer,
    selector: SourceSelector,
    generator: SignalGenerator,
    learner: AdaptiveLearner,
    metrics: SourceMetricsStore,
    dispatcher: Box<dyn QueryDispatcher>,
    rng: fastrand::Rng,
    cycle: u64,
}

impl CycleEngine {
    pub fn new(config: AgentConfig, dispatcher: Box<dyn QueryDispatcher>) -> Result<Self> {
        Self::with_seed(config, dispatcher, fastrand::u64(..))
    }

    /// Seeded constructor so scoring (and therefore selection) is
    /// reproducible in tests.
    pub fn with_seed(
        config: AgentConfig,
        dispatcher: Box<dyn QueryDispatcher>,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;

        let metrics =
            SourceMetricsStore::with_sources(config.sources.iter().map(String::as_str));

        Ok(Self {
            sources: config.sources.clone(),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            assessor: ContextAssessor::new(config.session_hours.clone()),
            scorer: SourceScorer::new(&config.selection),
            selector: SourceSelector::new(config.selection.budgets.clone()),
            generator: SignalGenerator::with_thresholds(&config.thresholds),
            learner: AdaptiveLearner::new(config.selection.learning_rate),
            metrics,
            dispatcher,
            rng: fastrand::Rng::with_seed(seed),
            cycle: 0,
        })
    }

    pub fn metrics(&self) -> &SourceMetricsStore {
        &self.metrics
    }

    /// Run one full cycle from a price snapshot.
    ///
    /// An unusable snapshot aborts here with no signals and no metric
    /// updates; the caller retries on the next schedule tick.
    pub async fn run_cycle(&mut self, snapshot: &PriceSnapshot) -> Result<CycleRecord> {
        let started_at = Utc::now();
        let context = self.assessor.assess(snapshot)?;

        info!(
            cycle = self.cycle,
            volatility = context.volatility.as_str(),
            trend = context.trend.as_str(),
            session = context.session.as_str(),
            "Cycle started"
        );

        let scored = self
            .scorer
            .score(&self.sources, &context, &self.metrics, &mut self.rng);
        let selected = self.selector.select(&scored, context.volatility);

        let outcomes = self.dispatch(&selected).await;
        let signals = self.generator.generate(&outcomes, &context);

        self.learner
            .update(&mut self.metrics, &outcomes, &signals, &context, &selected);

        let record = CycleRecord {
            cycle: self.cycle,
            started_at,
            context,
            scored_sources: scored,
            outcomes_summary: summarize(&outcomes),
            selected,
            signals,
            metrics_snapshot: self.metrics.clone(),
        };

        info!(
            cycle = self.cycle,
            selected = record.selected.len(),
            signals = record.signals.len(),
            "Cycle complete"
        );

        self.cycle += 1;
        Ok(record)
    }

    /// Dispatch with a timeout; a timed-out or failed round trip degrades
    /// to an empty outcome map so the learner still runs.
    async fn dispatch(&self, selected: &[String]) -> HashMap<String, QueryOutcome> {
        let outcomes =
            match tokio::time::timeout(self.query_timeout, self.dispatcher.dispatch(selected))
                .await
            {
                Ok(Ok(outcomes)) => outcomes,
                Ok(Err(e)) => {
                    warn!(error = %e, "Dispatcher failed, learning failures for this cycle");
                    HashMap::new()
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.query_timeout.as_secs(),
                        "Dispatcher timed out, learning failures for this cycle"
                    );
                    HashMap::new()
                }
            };

        for source_id in selected {
            let resolved = outcomes.get(source_id).map(|o| o.success).unwrap_or(false);
            if !resolved {
                warn!(source = source_id.as_str(), "Partial outcome: no usable data");
            }
        }

        outcomes
    }
}

fn summarize(outcomes: &HashMap<String, QueryOutcome>) -> HashMap<String, OutcomeSummary> {
    outcomes
        .iter()
        .map(|(id, o)| {
            (
                id.clone(),
                OutcomeSummary {
                    success: o.success,
                    latency_ms: o.latency_ms,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::StaticDispatcher;
    use chrono::TimeZone;
    use common::{SignalType, VolatilityTier};
    use serde_json::json;

    fn snapshot(change: f64) -> PriceSnapshot {
        PriceSnapshot {
            price: 60_000.0,
            change_24h_pct: change,
            volume_ratio: 1.1,
            timestamp_utc: Some(Utc.with_ymd_and_hms(2025, 3, 14, 14, 0, 0).unwrap()),
        }
    }

    fn engine_with(
        outcomes: HashMap<String, QueryOutcome>,
    ) -> CycleEngine {
        CycleEngine::with_seed(
            AgentConfig::default(),
            Box::new(StaticDispatcher::new(outcomes)),
            42,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_selection_size_tracks_volatility_tier() {
        let mut engine = engine_with(HashMap::new());

        // 4.2% is MEDIUM, not HIGH: budget 4.
        let record = engine.run_cycle(&snapshot(4.2)).await.unwrap();
        assert_eq!(record.context.volatility, VolatilityTier::Medium);
        assert_eq!(record.selected.len(), 4);

        // 6.0% is HIGH: budget 6.
        let record = engine.run_cycle(&snapshot(6.0)).await.unwrap();
        assert_eq!(record.context.volatility, VolatilityTier::High);
        assert_eq!(record.selected.len(), 6);
    }

    #[tokio::test]
    async fn test_empty_outcomes_learn_failures_and_emit_nothing() {
        let mut engine = engine_with(HashMap::new());

        let record = engine.run_cycle(&snapshot(6.0)).await.unwrap();

        assert!(record.signals.is_empty());
        for source_id in &record.selected {
            let metric = engine.metrics().get(source_id).unwrap();
            // One failed observation from the neutral 0.5 start.
            assert!((metric.success_rate - 0.45).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_whale_outcome_flows_through_to_signal_and_learning() {
        let mut outcomes = HashMap::new();
        for id in common::LOGICAL_SOURCES {
            outcomes.insert(id.to_string(), QueryOutcome::ok(json!({}), 30));
        }
        outcomes.insert(
            "whaleMovements".to_string(),
            QueryOutcome::ok(json!({"largest_tx_btc": 150.0}), 30),
        );

        // Budget covering every candidate so the whale source is always
        // queried regardless of exploration noise.
        let mut config = AgentConfig::default();
        config.selection.budgets.high = 8;
        let mut engine = CycleEngine::with_seed(
            config,
            Box::new(StaticDispatcher::new(outcomes)),
            42,
        )
        .unwrap();

        let record = engine.run_cycle(&snapshot(6.0)).await.unwrap();

        assert!(record.selected.contains(&"whaleMovements".to_string()));
        let whale_signals: Vec<&Signal> = record
            .signals
            .iter()
            .filter(|s| s.signal_type == SignalType::WhaleActivity)
            .collect();
        assert_eq!(whale_signals.len(), 1);

        let metric = engine.metrics().get("whaleMovements").unwrap();
        assert!(metric.signal_quality > 0.5);
    }

    #[tokio::test]
    async fn test_invalid_snapshot_aborts_without_touching_metrics() {
        let mut engine = engine_with(HashMap::new());
        let mut bad = snapshot(1.0);
        bad.price = f64::NAN;

        let before = engine.metrics().clone();
        let result = engine.run_cycle(&bad).await;

        assert!(result.is_err());
        for metric in before.iter() {
            let after = engine.metrics().get(&metric.source_id).unwrap();
            assert_eq!(after.success_rate, metric.success_rate);
            assert_eq!(after.cycles_since_used, metric.cycles_since_used);
        }
    }

    #[tokio::test]
    async fn test_cycle_record_serializes() {
        let mut engine = engine_with(HashMap::new());
        let record = engine.run_cycle(&snapshot(0.4)).await.unwrap();

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["cycle"], 0);
        assert_eq!(value["context"]["volatility"], "LOW");
        assert_eq!(value["scored_sources"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_deterministic_selection_under_fixed_seed() {
        let mut a = engine_with(HashMap::new());
        let mut b = engine_with(HashMap::new());

        let ra = a.run_cycle(&snapshot(2.5)).await.unwrap();
        let rb = b.run_cycle(&snapshot(2.5)).await.unwrap();
        assert_eq!(ra.selected, rb.selected);
    }
}
