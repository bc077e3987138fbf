//! Cycle record storage boundary
//!
//! External persistence is a collaborator; the in-memory implementation
//! backs tests, examples, and single-process deployments.

use crate::cycle::CycleRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trait for cycle record storage backends.
#[async_trait]
pub trait CycleStore: Send + Sync {
    /// Store one cycle record.
    async fn store(&self, record: &CycleRecord) -> Result<()>;

    /// The most recent `n` records, newest last.
    async fn recent(&self, n: usize) -> Result<Vec<CycleRecord>>;

    /// Aggregate statistics over everything stored.
    async fn stats(&self) -> Result<CycleStoreStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStoreStats {
    pub total_cycles: usize,
    pub total_signals: usize,
    pub signals_by_type: HashMap<String, usize>,
}

/// In-memory cycle storage (for testing and development).
pub struct InMemoryCycleStore {
    records: tokio::sync::RwLock<Vec<CycleRecord>>,
}

impl InMemoryCycleStore {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryCycleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CycleStore for InMemoryCycleStore {
    async fn store(&self, record: &CycleRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }

    async fn recent(&self, n: usize) -> Result<Vec<CycleRecord>> {
        let records = self.records.read().await;
        let start = records.len().saturating_sub(n);
        Ok(records[start..].to_vec())
    }

    async fn stats(&self) -> Result<CycleStoreStats> {
        let records = self.records.read().await;

        let mut signals_by_type = HashMap::new();
        let mut total_signals = 0;
        for record in records.iter() {
            for signal in &record.signals {
                total_signals += 1;
                *signals_by_type
                    .entry(format!("{:?}", signal.signal_type))
                    .or_insert(0) += 1;
            }
        }

        Ok(CycleStoreStats {
            total_cycles: records.len(),
            total_signals,
            signals_by_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::cycle::CycleEngine;
    use crate::dispatcher::StaticDispatcher;
    use common::{PriceSnapshot, QueryOutcome};
    use serde_json::json;
    use std::collections::HashMap;

    async fn sample_record(change: f64) -> CycleRecord {
        let mut outcomes = HashMap::new();
        outcomes.insert(
            "whaleMovements".to_string(),
            QueryOutcome::ok(json!({"largest_tx_btc": 200.0}), 25),
        );
        let mut config = AgentConfig::default();
        config.selection.budgets.low = 8;
        config.selection.budgets.medium = 8;
        config.selection.budgets.high = 8;
        let mut engine =
            CycleEngine::with_seed(config, Box::new(StaticDispatcher::new(outcomes)), 9).unwrap();
        let snapshot = PriceSnapshot {
            price: 50_000.0,
            change_24h_pct: change,
            volume_ratio: 1.0,
            timestamp_utc: None,
        };
        engine.run_cycle(&snapshot).await.unwrap()
    }

    #[tokio::test]
    async fn test_store_and_recent() {
        let store = InMemoryCycleStore::new();
        store.store(&sample_record(0.5).await).await.unwrap();
        store.store(&sample_record(3.0).await).await.unwrap();

        let recent = store.recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);

        let all = store.recent(10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_counts_signals_by_type() {
        let store = InMemoryCycleStore::new();
        store.store(&sample_record(0.5).await).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_cycles, 1);
        assert_eq!(stats.total_signals, 1);
        assert_eq!(stats.signals_by_type.get("WhaleActivity"), Some(&1));
    }
}
