//! Agent configuration

use common::{AgentError, SessionHours, LOGICAL_SOURCES};
use serde::{Deserialize, Serialize};
use signal_generation::RuleThresholds;
use source_selection::SelectionConfig;

/// Top-level agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Seconds between cycles.
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,

    /// Ceiling on one dispatcher round trip; an expired cycle learns
    /// failures for the unresolved sources.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Candidate logical sources scored every cycle.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// UTC session hour buckets.
    #[serde(default)]
    pub session_hours: SessionHours,

    /// Scoring, budgets, and learning.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Signal rule thresholds.
    #[serde(default)]
    pub thresholds: RuleThresholds,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: default_cycle_interval_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            sources: default_sources(),
            session_hours: SessionHours::default(),
            selection: SelectionConfig::default(),
            thresholds: RuleThresholds::default(),
        }
    }
}

fn default_cycle_interval_secs() -> u64 {
    60
}

fn default_query_timeout_secs() -> u64 {
    20
}

fn default_sources() -> Vec<String> {
    LOGICAL_SOURCES.iter().map(|s| s.to_string()).collect()
}

impl AgentConfig {
    /// Validate everything once at startup; configuration problems never
    /// surface per-cycle.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.cycle_interval_secs == 0 {
            return Err(AgentError::Configuration(
                "cycle_interval_secs must be positive".to_string(),
            ));
        }
        if self.query_timeout_secs == 0 {
            return Err(AgentError::Configuration(
                "query_timeout_secs must be positive".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(AgentError::Configuration(
                "at least one logical source is required".to_string(),
            ));
        }
        self.session_hours.validate()?;
        self.selection.validate()?;
        self.thresholds.validate()?;
        Ok(())
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &str) -> anyhow::Result<AgentConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AgentConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to a TOML file.
pub fn save_config(config: &AgentConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Write a commented default configuration file.
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    let template = "# Adaptive market agent configuration

# Seconds between cycles
cycle_interval_secs = 60

# Ceiling on one dispatcher round trip (seconds)
query_timeout_secs = 20

# Candidate logical sources scored every cycle
sources = [
    \"priceData\",
    \"whaleMovements\",
    \"fundingRates\",
    \"marketSentiment\",
    \"newsNarratives\",
    \"institutionalFlows\",
    \"technicalIndicators\",
    \"exchangeSpreads\",
]

# UTC hour boundaries for the trading-session buckets.
# Hours outside [european_open, american_close) are the Asian session.
[session_hours]
european_open = 8
overlap_open = 13
overlap_close = 16
american_close = 22

[selection]
# EMA learning rate
learning_rate = 0.1

# Sources queried per cycle, by volatility tier
[selection.budgets]
high = 6
medium = 4
low = 3

# Bonus per cycle a source goes unqueried, capped
[selection.recency]
increment = 0.05
cap_cycles = 10

# Randomized exploration override
[selection.exploration]
probability = 0.2
max_bonus = 0.3

# Per-dimension caps on the context bonus
[selection.context_weights]
volatility = 0.4
trend = 0.2
session = 0.3

[thresholds]
# Single transaction size flagging whale activity (BTC)
whale_tx_btc = 100.0

# Funding rate firing EXTREME_FUNDING (percent, strict >)
funding_rate_pct = 5.0

# Fear & greed extremes
fear_below = 25.0
greed_above = 75.0

# One-sided narrative items in the window
narrative_items = 3.0

# Institutional holdings change (percent)
institutional_change_pct = 5.0

# Cross-venue spread (percent)
spread_pct = 0.5
";

    std::fs::write(path, template)?;
    Ok(())
}
