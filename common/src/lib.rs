//! Shared domain types for the adaptive market agent
//!
//! Everything that crosses a crate boundary lives here: the price snapshot
//! and market context, query outcomes, signals, the logical source registry,
//! and the error taxonomy.

mod context;
mod error;
mod outcome;
mod signal;

pub use context::{
    ContextAssessor, MarketContext, PriceSnapshot, SessionHours, TradingSession, Trend,
    VolatilityTier,
};
pub use error::AgentError;
pub use outcome::{sources, QueryOutcome, LOGICAL_SOURCES};
pub use signal::{Severity, Signal, SignalType};
