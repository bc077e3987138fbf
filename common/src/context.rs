//! Market context assessment
//!
//! Derives the per-cycle (volatility, trend, session) tuple from a raw price
//! snapshot. Assessment is a pure function: the same snapshot always yields
//! the same context, and nothing here touches learned state.

use crate::error::AgentError;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw price snapshot handed to the agent at the start of a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub price: f64,
    pub change_24h_pct: f64,
    pub volume_ratio: f64,
    pub timestamp_utc: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    /// Parse the boundary payload `{price, change_24h_pct, volume_ratio,
    /// timestamp_utc}`.
    ///
    /// `price` and `change_24h_pct` are required and must be numeric;
    /// `volume_ratio` defaults to 1.0 and an unparseable timestamp is
    /// dropped rather than failing the cycle.
    pub fn from_json(raw: &Value) -> Result<Self, AgentError> {
        let price = raw
            .get("price")
            .and_then(Value::as_f64)
            .ok_or_else(|| AgentError::InvalidInput("price is missing or non-numeric".into()))?;
        let change_24h_pct = raw.get("change_24h_pct").and_then(Value::as_f64).ok_or_else(|| {
            AgentError::InvalidInput("change_24h_pct is missing or non-numeric".into())
        })?;

        let volume_ratio = raw.get("volume_ratio").and_then(Value::as_f64).unwrap_or(1.0);
        let timestamp_utc = raw
            .get("timestamp_utc")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Ok(Self {
            price,
            change_24h_pct,
            volume_ratio,
            timestamp_utc,
        })
    }
}

/// Volatility tier derived from the absolute 24h percent change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityTier {
    Low,
    Medium,
    High,
}

impl VolatilityTier {
    /// Boundary policy: exactly 2.0 is MEDIUM and exactly 5.0 is HIGH.
    pub fn from_change_pct(change_24h_pct: f64) -> Self {
        let magnitude = change_24h_pct.abs();
        if magnitude >= 5.0 {
            VolatilityTier::High
        } else if magnitude >= 2.0 {
            VolatilityTier::Medium
        } else {
            VolatilityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityTier::Low => "low",
            VolatilityTier::Medium => "medium",
            VolatilityTier::High => "high",
        }
    }
}

/// Price trend over the last 24h, with a ±1% dead-band so noise does not
/// flip the trend between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub fn from_change_pct(change_24h_pct: f64) -> Self {
        if change_24h_pct > 1.0 {
            Trend::Bullish
        } else if change_24h_pct < -1.0 {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Neutral => "neutral",
        }
    }
}

/// Trading session bucketed from the UTC hour of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingSession {
    Asian,
    European,
    American,
    Overlap,
}

impl TradingSession {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingSession::Asian => "asian",
            TradingSession::European => "european",
            TradingSession::American => "american",
            TradingSession::Overlap => "overlap",
        }
    }
}

/// UTC hour boundaries for the session buckets.
///
/// The European/American overlap is its own bucket, not a derived
/// combination. Hours wrap: everything from `american_close` to midnight and
/// from midnight to `european_open` is the Asian session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHours {
    #[serde(default = "default_european_open")]
    pub european_open: u32,
    #[serde(default = "default_overlap_open")]
    pub overlap_open: u32,
    #[serde(default = "default_overlap_close")]
    pub overlap_close: u32,
    #[serde(default = "default_american_close")]
    pub american_close: u32,
}

impl Default for SessionHours {
    fn default() -> Self {
        Self {
            european_open: 8,
            overlap_open: 13,
            overlap_close: 16,
            american_close: 22,
        }
    }
}

fn default_european_open() -> u32 {
    8
}

fn default_overlap_open() -> u32 {
    13
}

fn default_overlap_close() -> u32 {
    16
}

fn default_american_close() -> u32 {
    22
}

impl SessionHours {
    pub fn session_for_hour(&self, hour: u32) -> TradingSession {
        if hour < self.european_open || hour >= self.american_close {
            TradingSession::Asian
        } else if hour < self.overlap_open {
            TradingSession::European
        } else if hour < self.overlap_close {
            TradingSession::Overlap
        } else {
            TradingSession::American
        }
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        let ordered = self.european_open < self.overlap_open
            && self.overlap_open < self.overlap_close
            && self.overlap_close < self.american_close
            && self.american_close <= 24;
        if !ordered {
            return Err(AgentError::Configuration(format!(
                "session hours must be strictly increasing and within 0..24, got {}/{}/{}/{}",
                self.european_open, self.overlap_open, self.overlap_close, self.american_close
            )));
        }
        Ok(())
    }
}

/// Discrete market conditions for one cycle.
///
/// Created fresh from a snapshot, never mutated, and used to index the
/// per-context scores in the metrics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    pub volatility: VolatilityTier,
    pub trend: Trend,
    pub session: TradingSession,
}

impl MarketContext {
    pub fn volatility_key(&self) -> String {
        format!("volatility:{}", self.volatility.as_str())
    }

    pub fn trend_key(&self) -> String {
        format!("trend:{}", self.trend.as_str())
    }

    pub fn session_key(&self) -> String {
        format!("session:{}", self.session.as_str())
    }
}

/// Derives a [`MarketContext`] from a price snapshot.
#[derive(Debug, Clone, Default)]
pub struct ContextAssessor {
    sessions: SessionHours,
}

impl ContextAssessor {
    pub fn new(sessions: SessionHours) -> Self {
        Self { sessions }
    }

    /// Classify the snapshot into (volatility, trend, session).
    ///
    /// Fails only when the price or the 24h change is non-numeric; a missing
    /// timestamp falls into the hour-zero session bucket so the cycle can
    /// proceed on partial data.
    pub fn assess(&self, snapshot: &PriceSnapshot) -> Result<MarketContext, AgentError> {
        if !snapshot.price.is_finite() || snapshot.price <= 0.0 {
            return Err(AgentError::InvalidInput(format!(
                "unusable price {}",
                snapshot.price
            )));
        }
        if !snapshot.change_24h_pct.is_finite() {
            return Err(AgentError::InvalidInput(format!(
                "unusable 24h change {}",
                snapshot.change_24h_pct
            )));
        }

        let hour = snapshot.timestamp_utc.map(|ts| ts.hour()).unwrap_or(0);

        Ok(MarketContext {
            volatility: VolatilityTier::from_change_pct(snapshot.change_24h_pct),
            trend: Trend::from_change_pct(snapshot.change_24h_pct),
            session: self.sessions.session_for_hour(hour),
        })
    }
}
