//! Autonomous source selection and adaptive learning
//!
//! Scores the candidate data sources against the current market context,
//! picks a bounded subset under a volatility-dependent budget, and feeds
//! query outcomes back into per-source statistics with an exponential
//! moving average. Scoring reads the metrics store; only the learner
//! mutates it.

mod config;
mod learner;
mod metrics;
mod scorer;
mod selector;

pub use config::{
    ContextWeights, ExplorationConfig, RecencyConfig, SelectionBudgets, SelectionConfig,
};
pub use learner::AdaptiveLearner;
pub use metrics::{SourceMetric, SourceMetricsStore};
pub use scorer::{ScoredSource, SourceScorer};
pub use selector::SourceSelector;
