//! Signal generation
//!
//! Turns a cycle's query outcomes into typed, severity-ranked signals by
//! evaluating a declarative rule table. Rules are data: adding a signal type
//! means adding a table row, not touching the evaluator.

mod generator;
mod rules;

pub use generator::SignalGenerator;
pub use rules::{default_rules, RuleCondition, RuleThresholds, SignalRule};
