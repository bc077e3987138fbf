//! Typed signals emitted after rule evaluation of a cycle's query outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Signal type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalType {
    WhaleActivity,
    ExtremeFunding,
    ExtremeFear,
    ExtremeGreed,
    PositiveNarrative,
    NegativeNarrative,
    TechnicalBreakout,
    InstitutionalAccumulation,
    ArbitrageOpportunity,
}

/// Signal severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// A discrete, severity-ranked event for downstream agents.
///
/// Immutable once created; `source_data` carries the triggering outcome
/// payload verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: Uuid,
    pub signal_type: SignalType,
    pub severity: Severity,
    pub confidence: f64,
    pub message: String,
    /// Logical source whose outcome fired the rule.
    pub source: String,
    pub source_data: Value,
    pub recommended_action: String,
    pub target_agents: Vec<String>,
    pub created_at: DateTime<Utc>,
}
