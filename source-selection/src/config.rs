//! Selection and learning configuration

use common::AgentError;
use serde::{Deserialize, Serialize};

/// Tuning knobs for scoring, selection, and learning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// EMA learning rate applied by the adaptive learner.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// How many sources to query per volatility tier.
    #[serde(default)]
    pub budgets: SelectionBudgets,

    /// Recency bonus for sources that have not been queried recently.
    #[serde(default)]
    pub recency: RecencyConfig,

    /// Randomized exploration override.
    #[serde(default)]
    pub exploration: ExplorationConfig,

    /// Per-category caps on the context bonus.
    #[serde(default)]
    pub context_weights: ContextWeights,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            budgets: SelectionBudgets::default(),
            recency: RecencyConfig::default(),
            exploration: ExplorationConfig::default(),
            context_weights: ContextWeights::default(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.1
}

impl SelectionConfig {
    /// Reject out-of-range values at startup rather than per-cycle.
    pub fn validate(&self) -> Result<(), AgentError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(AgentError::Configuration(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        self.budgets.validate()?;
        if self.recency.increment < 0.0 {
            return Err(AgentError::Configuration(format!(
                "recency.increment must be non-negative, got {}",
                self.recency.increment
            )));
        }
        if !(0.0..=1.0).contains(&self.exploration.probability) {
            return Err(AgentError::Configuration(format!(
                "exploration.probability must be in [0, 1], got {}",
                self.exploration.probability
            )));
        }
        if self.exploration.max_bonus < 0.0 {
            return Err(AgentError::Configuration(format!(
                "exploration.max_bonus must be non-negative, got {}",
                self.exploration.max_bonus
            )));
        }
        let w = &self.context_weights;
        if w.volatility < 0.0 || w.trend < 0.0 || w.session < 0.0 {
            return Err(AgentError::Configuration(
                "context weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Number of sources queried per cycle, keyed by volatility tier.
///
/// A budget is a ceiling: when fewer candidates exist, all are selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionBudgets {
    #[serde(default = "default_budget_high")]
    pub high: usize,
    #[serde(default = "default_budget_medium")]
    pub medium: usize,
    #[serde(default = "default_budget_low")]
    pub low: usize,
}

impl Default for SelectionBudgets {
    fn default() -> Self {
        Self {
            high: 6,
            medium: 4,
            low: 3,
        }
    }
}

fn default_budget_high() -> usize {
    6
}

fn default_budget_medium() -> usize {
    4
}

fn default_budget_low() -> usize {
    3
}

impl SelectionBudgets {
    fn validate(&self) -> Result<(), AgentError> {
        if self.high == 0 || self.medium == 0 || self.low == 0 {
            return Err(AgentError::Configuration(format!(
                "selection budgets must be at least 1, got high={} medium={} low={}",
                self.high, self.medium, self.low
            )));
        }
        Ok(())
    }
}

/// Flat per-cycle bonus for unused sources, capped so an idle source cannot
/// dominate the ranking through unbounded growth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyConfig {
    #[serde(default = "default_recency_increment")]
    pub increment: f64,
    #[serde(default = "default_recency_cap")]
    pub cap_cycles: u32,
}

impl Default for RecencyConfig {
    fn default() -> Self {
        Self {
            increment: 0.05,
            cap_cycles: 10,
        }
    }
}

fn default_recency_increment() -> f64 {
    0.05
}

fn default_recency_cap() -> u32 {
    10
}

/// Randomized exploration: with `probability` per source per cycle, a
/// uniform bonus in `[0, max_bonus)` perturbs the ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    #[serde(default = "default_exploration_probability")]
    pub probability: f64,
    #[serde(default = "default_exploration_max_bonus")]
    pub max_bonus: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            probability: 0.2,
            max_bonus: 0.3,
        }
    }
}

fn default_exploration_probability() -> f64 {
    0.2
}

fn default_exploration_max_bonus() -> f64 {
    0.3
}

/// Maximum additive bonus per context dimension. The learned context score
/// in [0, 1] is scaled into [0, weight].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWeights {
    #[serde(default = "default_volatility_weight")]
    pub volatility: f64,
    #[serde(default = "default_trend_weight")]
    pub trend: f64,
    #[serde(default = "default_session_weight")]
    pub session: f64,
}

impl Default for ContextWeights {
    fn default() -> Self {
        Self {
            volatility: 0.4,
            trend: 0.2,
            session: 0.3,
        }
    }
}

fn default_volatility_weight() -> f64 {
    0.4
}

fn default_trend_weight() -> f64 {
    0.2
}

fn default_session_weight() -> f64 {
    0.3
}
