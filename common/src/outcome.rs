//! Query outcomes and the logical source registry

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical source identifiers.
///
/// A logical source is a named data category, distinct from whichever
/// provider ultimately serves it.
pub mod sources {
    pub const PRICE_DATA: &str = "priceData";
    pub const WHALE_MOVEMENTS: &str = "whaleMovements";
    pub const FUNDING_RATES: &str = "fundingRates";
    pub const MARKET_SENTIMENT: &str = "marketSentiment";
    pub const NEWS_NARRATIVES: &str = "newsNarratives";
    pub const INSTITUTIONAL_FLOWS: &str = "institutionalFlows";
    pub const TECHNICAL_INDICATORS: &str = "technicalIndicators";
    pub const EXCHANGE_SPREADS: &str = "exchangeSpreads";
}

/// The fixed candidate set scored every cycle.
pub const LOGICAL_SOURCES: [&str; 8] = [
    sources::PRICE_DATA,
    sources::WHALE_MOVEMENTS,
    sources::FUNDING_RATES,
    sources::MARKET_SENTIMENT,
    sources::NEWS_NARRATIVES,
    sources::INSTITUTIONAL_FLOWS,
    sources::TECHNICAL_INDICATORS,
    sources::EXCHANGE_SPREADS,
];

/// Result of querying one logical source, as returned by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub data: Value,
    pub latency_ms: u64,
}

impl QueryOutcome {
    pub fn ok(data: Value, latency_ms: u64) -> Self {
        Self {
            success: true,
            data,
            latency_ms,
        }
    }

    pub fn failed(latency_ms: u64) -> Self {
        Self {
            success: false,
            data: Value::Null,
            latency_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_unique() {
        let mut ids: Vec<&str> = LOGICAL_SOURCES.to_vec();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
