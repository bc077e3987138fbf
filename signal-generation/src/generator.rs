//! Rule evaluation over a cycle's query outcomes

use crate::rules::{default_rules, RuleEval, RuleThresholds, SignalRule};
use chrono::Utc;
use common::{MarketContext, QueryOutcome, Signal};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Evaluates the rule table against each cycle's outcomes.
///
/// Stateless between calls: every rule is evaluated independently and may
/// fire zero or more signals per cycle.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    rules: Vec<SignalRule>,
}

impl SignalGenerator {
    pub fn new(rules: Vec<SignalRule>) -> Self {
        Self { rules }
    }

    pub fn with_thresholds(thresholds: &RuleThresholds) -> Self {
        Self::new(default_rules(thresholds))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Evaluate every rule against the outcome of its source.
    ///
    /// A failed query, a missing outcome, or a malformed payload skips the
    /// rule and never fails the cycle.
    pub fn generate(
        &self,
        outcomes: &HashMap<String, QueryOutcome>,
        context: &MarketContext,
    ) -> Vec<Signal> {
        let mut signals = Vec::new();

        for rule in &self.rules {
            let outcome = match outcomes.get(&rule.source) {
                Some(outcome) => outcome,
                None => {
                    debug!(
                        source = rule.source.as_str(),
                        signal_type = ?rule.signal_type,
                        "No outcome for rule source, skipping"
                    );
                    continue;
                }
            };

            if !outcome.success {
                debug!(
                    source = rule.source.as_str(),
                    signal_type = ?rule.signal_type,
                    "Source query failed, skipping rule"
                );
                continue;
            }

            match rule.condition.evaluate(&outcome.data) {
                RuleEval::Fired {
                    confidence,
                    observed,
                } => {
                    debug!(
                        signal_type = ?rule.signal_type,
                        source = rule.source.as_str(),
                        confidence,
                        "Rule fired"
                    );
                    signals.push(Signal {
                        id: Uuid::new_v4(),
                        signal_type: rule.signal_type,
                        severity: rule.severity,
                        confidence,
                        message: format!("{} (observed {})", rule.message, observed),
                        source: rule.source.clone(),
                        source_data: outcome.data.clone(),
                        recommended_action: rule.recommended_action.clone(),
                        target_agents: rule.target_agents.clone(),
                        created_at: Utc::now(),
                    });
                }
                RuleEval::NotFired => {}
                RuleEval::Malformed => {
                    warn!(
                        source = rule.source.as_str(),
                        signal_type = ?rule.signal_type,
                        "Malformed outcome payload, skipping rule"
                    );
                }
            }
        }

        info!(
            signals = signals.len(),
            volatility = context.volatility.as_str(),
            trend = context.trend.as_str(),
            session = context.session.as_str(),
            "Signal generation complete"
        );

        signals
    }
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::with_thresholds(&RuleThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Severity, SignalType, TradingSession, Trend, VolatilityTier};
    use serde_json::json;

    fn context() -> MarketContext {
        MarketContext {
            volatility: VolatilityTier::Medium,
            trend: Trend::Neutral,
            session: TradingSession::Asian,
        }
    }

    fn outcomes_with(source: &str, data: serde_json::Value) -> HashMap<String, QueryOutcome> {
        let mut outcomes = HashMap::new();
        outcomes.insert(source.to_string(), QueryOutcome::ok(data, 80));
        outcomes
    }

    #[test]
    fn test_whale_outcome_yields_one_high_signal() {
        let generator = SignalGenerator::default();
        let outcomes = outcomes_with("whaleMovements", json!({"largest_tx_btc": 150.0}));

        let signals = generator.generate(&outcomes, &context());

        assert_eq!(signals.len(), 1);
        let signal = &signals[0];
        assert_eq!(signal.signal_type, SignalType::WhaleActivity);
        assert_eq!(signal.severity, Severity::High);
        assert!((signal.confidence - 0.5).abs() < 1e-12);
        assert_eq!(signal.source, "whaleMovements");
        assert_eq!(
            signal.target_agents,
            vec!["risk-manager".to_string(), "execution".to_string()]
        );
    }

    #[test]
    fn test_funding_boundary_is_strict() {
        let generator = SignalGenerator::default();

        let at = outcomes_with("fundingRates", json!({"funding_rate_pct": 5.0}));
        assert!(generator.generate(&at, &context()).is_empty());

        let past = outcomes_with("fundingRates", json!({"funding_rate_pct": 5.0001}));
        let signals = generator.generate(&past, &context());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::ExtremeFunding);
        assert_eq!(signals[0].severity, Severity::Critical);
    }

    #[test]
    fn test_empty_outcomes_yield_no_signals() {
        let generator = SignalGenerator::default();
        let signals = generator.generate(&HashMap::new(), &context());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_failed_outcome_is_skipped() {
        let generator = SignalGenerator::default();
        let mut outcomes = HashMap::new();
        outcomes.insert(
            "whaleMovements".to_string(),
            QueryOutcome::failed(5_000),
        );
        assert!(generator.generate(&outcomes, &context()).is_empty());
    }

    #[test]
    fn test_malformed_payload_is_skipped_not_fatal() {
        let generator = SignalGenerator::default();
        let mut outcomes = outcomes_with("whaleMovements", json!({"unexpected": true}));
        outcomes.insert(
            "marketSentiment".to_string(),
            QueryOutcome::ok(json!({"fear_greed_index": 12.0}), 60),
        );

        let signals = generator.generate(&outcomes, &context());

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::ExtremeFear);
    }

    #[test]
    fn test_sentiment_extremes_are_disjoint() {
        let generator = SignalGenerator::default();

        let fear = outcomes_with("marketSentiment", json!({"fear_greed_index": 20.0}));
        let signals = generator.generate(&fear, &context());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::ExtremeFear);

        let greed = outcomes_with("marketSentiment", json!({"fear_greed_index": 80.0}));
        let signals = generator.generate(&greed, &context());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::ExtremeGreed);

        let neutral = outcomes_with("marketSentiment", json!({"fear_greed_index": 50.0}));
        assert!(generator.generate(&neutral, &context()).is_empty());
    }

    #[test]
    fn test_narrative_rules_fire_independently() {
        let generator = SignalGenerator::default();
        let outcomes = outcomes_with(
            "newsNarratives",
            json!({"bullish_items": 4, "bearish_items": 3}),
        );

        let signals = generator.generate(&outcomes, &context());

        let mut types: Vec<SignalType> = signals.iter().map(|s| s.signal_type).collect();
        types.sort_by_key(|t| format!("{:?}", t));
        assert_eq!(
            types,
            vec![SignalType::NegativeNarrative, SignalType::PositiveNarrative]
        );
    }

    #[test]
    fn test_technical_breakout_fixed_confidence() {
        let generator = SignalGenerator::default();
        let outcomes = outcomes_with("technicalIndicators", json!({"composite": "STRONG_BUY"}));

        let signals = generator.generate(&outcomes, &context());

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::TechnicalBreakout);
        assert!((signals[0].confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_multiple_sources_fire_in_one_cycle() {
        let generator = SignalGenerator::default();
        let mut outcomes = HashMap::new();
        outcomes.insert(
            "whaleMovements".to_string(),
            QueryOutcome::ok(json!({"largest_tx_btc": 250.0}), 100),
        );
        outcomes.insert(
            "exchangeSpreads".to_string(),
            QueryOutcome::ok(json!({"max_spread_pct": 0.9}), 45),
        );

        let signals = generator.generate(&outcomes, &context());

        assert_eq!(signals.len(), 2);
        assert!(signals
            .iter()
            .any(|s| s.signal_type == SignalType::ArbitrageOpportunity
                && s.severity == Severity::Low));
    }
}
