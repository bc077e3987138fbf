//! Query dispatcher boundary
//!
//! The core emits the selected source ids and consumes an aggregated
//! outcome mapping; everything between (API clients, the hosted model
//! interpreting pooled results, retries) lives behind this trait.

use anyhow::Result;
use async_trait::async_trait;
use common::{sources, QueryOutcome};
use futures::future::join_all;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Executes the actual source queries for one cycle.
#[async_trait]
pub trait QueryDispatcher: Send + Sync {
    /// Query every selected source, returning whatever resolved. Sources
    /// absent from the result are treated as failures by the learner.
    async fn dispatch(&self, selected: &[String]) -> Result<HashMap<String, QueryOutcome>>;
}

/// Dispatcher returning a fixed outcome map; for tests and examples.
pub struct StaticDispatcher {
    outcomes: HashMap<String, QueryOutcome>,
}

impl StaticDispatcher {
    pub fn new(outcomes: HashMap<String, QueryOutcome>) -> Self {
        Self { outcomes }
    }
}

#[async_trait]
impl QueryDispatcher for StaticDispatcher {
    async fn dispatch(&self, selected: &[String]) -> Result<HashMap<String, QueryOutcome>> {
        Ok(selected
            .iter()
            .filter_map(|id| self.outcomes.get(id).map(|o| (id.clone(), o.clone())))
            .collect())
    }
}

/// Dispatcher that fabricates plausible payloads, used by the demo binary
/// in place of live API clients.
pub struct SimulatedDispatcher {
    seed: u64,
    calls: AtomicU64,
    /// Fraction of queries that fail outright.
    failure_rate: f64,
}

impl SimulatedDispatcher {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            calls: AtomicU64::new(0),
            failure_rate: 0.1,
        }
    }
}

#[async_trait]
impl QueryDispatcher for SimulatedDispatcher {
    async fn dispatch(&self, selected: &[String]) -> Result<HashMap<String, QueryOutcome>> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);

        let queries = selected.iter().enumerate().map(|(i, id)| {
            let mut rng = fastrand::Rng::with_seed(
                self.seed ^ call.wrapping_mul(0x9e37_79b9) ^ i as u64,
            );
            let failure_rate = self.failure_rate;
            async move {
                let latency_ms = 40 + rng.u64(0..400);
                if rng.f64() < failure_rate {
                    debug!(source = id.as_str(), "Simulated query failure");
                    return (id.clone(), QueryOutcome::failed(latency_ms));
                }
                let data = simulated_payload(id, &mut rng);
                (id.clone(), QueryOutcome::ok(data, latency_ms))
            }
        });

        Ok(join_all(queries).await.into_iter().collect())
    }
}

fn simulated_payload(source_id: &str, rng: &mut fastrand::Rng) -> serde_json::Value {
    match source_id {
        sources::PRICE_DATA => json!({
            "price": 40_000.0 + rng.f64() * 40_000.0,
            "change_24h_pct": rng.f64() * 16.0 - 8.0,
        }),
        sources::WHALE_MOVEMENTS => json!({
            "largest_tx_btc": rng.f64() * 280.0,
            "tx_count": rng.u32(0..40),
        }),
        sources::FUNDING_RATES => json!({
            "funding_rate_pct": rng.f64() * 9.0 - 1.0,
        }),
        sources::MARKET_SENTIMENT => json!({
            "fear_greed_index": rng.f64() * 100.0,
        }),
        sources::NEWS_NARRATIVES => json!({
            "bullish_items": rng.u32(0..6),
            "bearish_items": rng.u32(0..6),
        }),
        sources::INSTITUTIONAL_FLOWS => json!({
            "holdings_change_pct": rng.f64() * 22.0 - 10.0,
        }),
        sources::TECHNICAL_INDICATORS => {
            let composites = ["STRONG_BUY", "BUY", "NEUTRAL", "SELL", "STRONG_SELL"];
            json!({ "composite": composites[rng.usize(0..composites.len())] })
        }
        sources::EXCHANGE_SPREADS => json!({
            "max_spread_pct": rng.f64() * 1.2,
        }),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_dispatcher_filters_to_selected() {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            "whaleMovements".to_string(),
            QueryOutcome::ok(json!({"largest_tx_btc": 120.0}), 50),
        );
        outcomes.insert(
            "fundingRates".to_string(),
            QueryOutcome::ok(json!({"funding_rate_pct": 1.0}), 60),
        );
        let dispatcher = StaticDispatcher::new(outcomes);

        let result = dispatcher
            .dispatch(&["whaleMovements".to_string(), "priceData".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(result.contains_key("whaleMovements"));
    }

    #[tokio::test]
    async fn test_simulated_dispatcher_covers_all_sources() {
        let dispatcher = SimulatedDispatcher::new(7);
        let selected: Vec<String> = common::LOGICAL_SOURCES
            .iter()
            .map(|s| s.to_string())
            .collect();

        let result = dispatcher.dispatch(&selected).await.unwrap();

        assert_eq!(result.len(), 8);
        for outcome in result.values() {
            assert!(outcome.latency_ms >= 40);
        }
    }
}
