//! Declarative signal rule table
//!
//! Each rule names the logical source it reads, a tagged condition over a
//! JSON pointer into the outcome payload, and the static metadata attached
//! to fired signals. The evaluator in `generator.rs` knows nothing about
//! individual signal types.

use common::{sources, AgentError, Severity, SignalType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rule thresholds, tunable without touching the table shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Single-transaction size that flags whale activity (BTC).
    #[serde(default = "default_whale_tx_btc")]
    pub whale_tx_btc: f64,
    /// Funding rate above this fires EXTREME_FUNDING (percent, strict).
    #[serde(default = "default_funding_rate_pct")]
    pub funding_rate_pct: f64,
    /// Fear & greed index below this fires EXTREME_FEAR.
    #[serde(default = "default_fear_below")]
    pub fear_below: f64,
    /// Fear & greed index above this fires EXTREME_GREED.
    #[serde(default = "default_greed_above")]
    pub greed_above: f64,
    /// Narrative items in the window that flag a one-sided narrative.
    #[serde(default = "default_narrative_items")]
    pub narrative_items: f64,
    /// Institutional holdings change that flags accumulation (percent).
    #[serde(default = "default_institutional_change_pct")]
    pub institutional_change_pct: f64,
    /// Cross-venue spread that flags an arbitrage opportunity (percent).
    #[serde(default = "default_spread_pct")]
    pub spread_pct: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            whale_tx_btc: 100.0,
            funding_rate_pct: 5.0,
            fear_below: 25.0,
            greed_above: 75.0,
            narrative_items: 3.0,
            institutional_change_pct: 5.0,
            spread_pct: 0.5,
        }
    }
}

fn default_whale_tx_btc() -> f64 {
    100.0
}

fn default_funding_rate_pct() -> f64 {
    5.0
}

fn default_fear_below() -> f64 {
    25.0
}

fn default_greed_above() -> f64 {
    75.0
}

fn default_narrative_items() -> f64 {
    3.0
}

fn default_institutional_change_pct() -> f64 {
    5.0
}

fn default_spread_pct() -> f64 {
    0.5
}

impl RuleThresholds {
    pub fn validate(&self) -> Result<(), AgentError> {
        let positive = [
            ("whale_tx_btc", self.whale_tx_btc),
            ("funding_rate_pct", self.funding_rate_pct),
            ("fear_below", self.fear_below),
            ("greed_above", self.greed_above),
            ("narrative_items", self.narrative_items),
            ("institutional_change_pct", self.institutional_change_pct),
            ("spread_pct", self.spread_pct),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(AgentError::Configuration(format!(
                    "threshold {} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.fear_below >= self.greed_above {
            return Err(AgentError::Configuration(format!(
                "fear_below ({}) must be less than greed_above ({})",
                self.fear_below, self.greed_above
            )));
        }
        Ok(())
    }
}

/// Condition over a JSON pointer path into the outcome payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RuleCondition {
    /// Fires when the numeric field is strictly above the threshold.
    Above { field: String, threshold: f64 },
    /// Fires when the numeric field is strictly below the threshold.
    Below { field: String, threshold: f64 },
    /// Fires when the numeric field is at or above the threshold.
    AtLeast { field: String, threshold: f64 },
    /// Fires when the string field equals any listed value.
    MatchesAny {
        field: String,
        values: Vec<String>,
        confidence: f64,
    },
}

/// Result of evaluating one condition against one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEval {
    Fired { confidence: f64, observed: String },
    NotFired,
    /// The payload is missing the field or has the wrong type.
    Malformed,
}

impl RuleCondition {
    pub fn evaluate(&self, data: &Value) -> RuleEval {
        match self {
            RuleCondition::Above { field, threshold } => {
                match data.pointer(field).and_then(Value::as_f64) {
                    Some(value) if value > *threshold => RuleEval::Fired {
                        confidence: margin_confidence(value, *threshold),
                        observed: format!("{:.4}", value),
                    },
                    Some(_) => RuleEval::NotFired,
                    None => RuleEval::Malformed,
                }
            }
            RuleCondition::Below { field, threshold } => {
                match data.pointer(field).and_then(Value::as_f64) {
                    Some(value) if value < *threshold => RuleEval::Fired {
                        confidence: margin_confidence(2.0 * threshold - value, *threshold),
                        observed: format!("{:.4}", value),
                    },
                    Some(_) => RuleEval::NotFired,
                    None => RuleEval::Malformed,
                }
            }
            RuleCondition::AtLeast { field, threshold } => {
                match data.pointer(field).and_then(Value::as_f64) {
                    Some(value) if value >= *threshold => RuleEval::Fired {
                        confidence: margin_confidence(value, *threshold),
                        observed: format!("{:.4}", value),
                    },
                    Some(_) => RuleEval::NotFired,
                    None => RuleEval::Malformed,
                }
            }
            RuleCondition::MatchesAny {
                field,
                values,
                confidence,
            } => match data.pointer(field).and_then(Value::as_str) {
                Some(value) if values.iter().any(|v| v == value) => RuleEval::Fired {
                    confidence: confidence.clamp(0.0, 1.0),
                    observed: value.to_string(),
                },
                Some(_) => RuleEval::NotFired,
                None => RuleEval::Malformed,
            },
        }
    }
}

/// Confidence grows with the relative margin past the threshold, clamped to
/// [0, 1]. An observation right at the threshold carries zero confidence.
fn margin_confidence(value: f64, threshold: f64) -> f64 {
    let scale = threshold.abs().max(f64::EPSILON);
    ((value - threshold) / scale).clamp(0.0, 1.0)
}

/// One row of the rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRule {
    pub signal_type: SignalType,
    pub severity: Severity,
    /// Logical source whose outcome this rule reads.
    pub source: String,
    pub condition: RuleCondition,
    pub message: String,
    pub recommended_action: String,
    /// Static routing per signal type; configuration, not computed.
    pub target_agents: Vec<String>,
}

/// The built-in rule table, parameterized by thresholds.
pub fn default_rules(thresholds: &RuleThresholds) -> Vec<SignalRule> {
    vec![
        SignalRule {
            signal_type: SignalType::WhaleActivity,
            severity: Severity::High,
            source: sources::WHALE_MOVEMENTS.to_string(),
            condition: RuleCondition::AtLeast {
                field: "/largest_tx_btc".to_string(),
                threshold: thresholds.whale_tx_btc,
            },
            message: "Large single transaction detected".to_string(),
            recommended_action: "Review position sizing and stop placement".to_string(),
            target_agents: vec!["risk-manager".to_string(), "execution".to_string()],
        },
        SignalRule {
            signal_type: SignalType::ExtremeFunding,
            severity: Severity::Critical,
            source: sources::FUNDING_RATES.to_string(),
            condition: RuleCondition::Above {
                field: "/funding_rate_pct".to_string(),
                threshold: thresholds.funding_rate_pct,
            },
            message: "Perpetual funding rate at an extreme".to_string(),
            recommended_action: "Reduce leveraged exposure".to_string(),
            target_agents: vec!["risk-manager".to_string(), "execution".to_string()],
        },
        SignalRule {
            signal_type: SignalType::ExtremeFear,
            severity: Severity::Medium,
            source: sources::MARKET_SENTIMENT.to_string(),
            condition: RuleCondition::Below {
                field: "/fear_greed_index".to_string(),
                threshold: thresholds.fear_below,
            },
            message: "Fear & greed index in extreme fear".to_string(),
            recommended_action: "Consider contrarian accumulation".to_string(),
            target_agents: vec!["strategy".to_string()],
        },
        SignalRule {
            signal_type: SignalType::ExtremeGreed,
            severity: Severity::Medium,
            source: sources::MARKET_SENTIMENT.to_string(),
            condition: RuleCondition::Above {
                field: "/fear_greed_index".to_string(),
                threshold: thresholds.greed_above,
            },
            message: "Fear & greed index in extreme greed".to_string(),
            recommended_action: "Tighten profit-taking levels".to_string(),
            target_agents: vec!["strategy".to_string()],
        },
        SignalRule {
            signal_type: SignalType::PositiveNarrative,
            severity: Severity::Medium,
            source: sources::NEWS_NARRATIVES.to_string(),
            condition: RuleCondition::AtLeast {
                field: "/bullish_items".to_string(),
                threshold: thresholds.narrative_items,
            },
            message: "Bullish narrative cluster in the news window".to_string(),
            recommended_action: "Track narrative momentum".to_string(),
            target_agents: vec!["strategy".to_string(), "research".to_string()],
        },
        SignalRule {
            signal_type: SignalType::NegativeNarrative,
            severity: Severity::Medium,
            source: sources::NEWS_NARRATIVES.to_string(),
            condition: RuleCondition::AtLeast {
                field: "/bearish_items".to_string(),
                threshold: thresholds.narrative_items,
            },
            message: "Bearish narrative cluster in the news window".to_string(),
            recommended_action: "Review downside hedges".to_string(),
            target_agents: vec!["strategy".to_string(), "research".to_string()],
        },
        SignalRule {
            signal_type: SignalType::InstitutionalAccumulation,
            severity: Severity::High,
            source: sources::INSTITUTIONAL_FLOWS.to_string(),
            condition: RuleCondition::Above {
                field: "/holdings_change_pct".to_string(),
                threshold: thresholds.institutional_change_pct,
            },
            message: "Institutional holdings increasing".to_string(),
            recommended_action: "Follow institutional flow".to_string(),
            target_agents: vec!["strategy".to_string(), "risk-manager".to_string()],
        },
        SignalRule {
            signal_type: SignalType::TechnicalBreakout,
            severity: Severity::High,
            source: sources::TECHNICAL_INDICATORS.to_string(),
            condition: RuleCondition::MatchesAny {
                field: "/composite".to_string(),
                values: vec!["STRONG_BUY".to_string(), "STRONG_SELL".to_string()],
                confidence: 0.8,
            },
            message: "Technical composite at a strong reading".to_string(),
            recommended_action: "Confirm breakout on a higher timeframe".to_string(),
            target_agents: vec!["execution".to_string(), "strategy".to_string()],
        },
        SignalRule {
            signal_type: SignalType::ArbitrageOpportunity,
            severity: Severity::Low,
            source: sources::EXCHANGE_SPREADS.to_string(),
            condition: RuleCondition::Above {
                field: "/max_spread_pct".to_string(),
                threshold: thresholds.spread_pct,
            },
            message: "Cross-venue price spread widened".to_string(),
            recommended_action: "Evaluate cross-venue execution".to_string(),
            target_agents: vec!["execution".to_string()],
        },
    ]
}
