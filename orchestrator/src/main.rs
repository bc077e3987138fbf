use anyhow::Result;
use chrono::Utc;
use common::PriceSnapshot;
use orchestrator::{
    create_config_template, load_config, AgentConfig, CycleEngine, CycleStore,
    InMemoryCycleStore, SimulatedDispatcher,
};
use std::time::Duration;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.get(1).map(String::as_str) == Some("--write-config") {
        let path = args.get(2).map(String::as_str).unwrap_or("agent.toml");
        create_config_template(path)?;
        info!(path, "Wrote configuration template");
        return Ok(());
    }

    let config = match args.get(1) {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };

    info!("🚀 Starting adaptive market agent");

    let interval_secs = config.cycle_interval_secs;
    let dispatcher = Box::new(SimulatedDispatcher::new(fastrand::u64(..)));
    let mut engine = CycleEngine::new(config, dispatcher)?;
    let store = InMemoryCycleStore::new();

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = simulated_snapshot();
                match engine.run_cycle(&snapshot).await {
                    Ok(record) => {
                        for signal in &record.signals {
                            info!(
                                signal_type = ?signal.signal_type,
                                severity = ?signal.severity,
                                confidence = signal.confidence,
                                targets = ?signal.target_agents,
                                "{}", signal.message
                            );
                        }
                        store.store(&record).await?;
                    }
                    Err(e) => {
                        error!(error = %e, "Cycle failed, retrying on next tick");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("👋 Shutting down gracefully...");
                break;
            }
        }
    }

    let stats = store.stats().await?;
    info!(
        cycles = stats.total_cycles,
        signals = stats.total_signals,
        "Agent stopped"
    );

    Ok(())
}

/// Stand-in for the external price feed.
fn simulated_snapshot() -> PriceSnapshot {
    PriceSnapshot {
        price: 40_000.0 + fastrand::f64() * 40_000.0,
        change_24h_pct: fastrand::f64() * 16.0 - 8.0,
        volume_ratio: 0.5 + fastrand::f64(),
        timestamp_utc: Some(Utc::now()),
    }
}
