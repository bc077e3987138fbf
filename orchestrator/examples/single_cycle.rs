//! Run one cycle against canned outcomes and print the resulting record.

use anyhow::Result;
use chrono::Utc;
use common::{PriceSnapshot, QueryOutcome};
use orchestrator::{AgentConfig, CycleEngine, StaticDispatcher};
use serde_json::json;
use std::collections::HashMap;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let mut outcomes = HashMap::new();
    outcomes.insert(
        "whaleMovements".to_string(),
        QueryOutcome::ok(json!({"largest_tx_btc": 185.0, "tx_count": 12}), 140),
    );
    outcomes.insert(
        "fundingRates".to_string(),
        QueryOutcome::ok(json!({"funding_rate_pct": 6.2}), 95),
    );
    outcomes.insert(
        "marketSentiment".to_string(),
        QueryOutcome::ok(json!({"fear_greed_index": 18.0}), 60),
    );
    outcomes.insert(
        "technicalIndicators".to_string(),
        QueryOutcome::ok(json!({"composite": "STRONG_BUY"}), 110),
    );

    let mut config = AgentConfig::default();
    config.selection.budgets.high = 8;

    let mut engine =
        CycleEngine::with_seed(config, Box::new(StaticDispatcher::new(outcomes)), 7)?;

    let snapshot = PriceSnapshot {
        price: 61_250.0,
        change_24h_pct: 6.4,
        volume_ratio: 1.8,
        timestamp_utc: Some(Utc::now()),
    };

    let record = engine.run_cycle(&snapshot).await?;

    println!("context: {}", serde_json::to_string(&record.context)?);
    println!("selected: {:?}", record.selected);
    for signal in &record.signals {
        println!(
            "[{:?}/{:?}] {} (confidence {:.2}) -> {:?}",
            signal.signal_type,
            signal.severity,
            signal.message,
            signal.confidence,
            signal.target_agents
        );
    }

    Ok(())
}
