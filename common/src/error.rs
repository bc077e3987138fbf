//! Error taxonomy for the agent core

/// Errors surfaced by the agent core.
///
/// `InvalidInput` aborts the current cycle before any metrics are touched;
/// `Configuration` is raised once at startup and never per-cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// The price snapshot is unusable (absent or non-numeric fields).
    InvalidInput(String),
    /// A configuration value is missing or out of range.
    Configuration(String),
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AgentError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AgentError {}
