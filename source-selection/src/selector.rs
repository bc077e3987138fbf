//! Budgeted source selection

use crate::config::SelectionBudgets;
use crate::scorer::ScoredSource;
use common::VolatilityTier;
use tracing::debug;

/// Picks the top-K scored sources under the volatility-derived budget.
///
/// Exploration noise has already been folded into the totals by the scorer,
/// so selection is a plain prefix of the ranking.
#[derive(Debug, Clone)]
pub struct SourceSelector {
    budgets: SelectionBudgets,
}

impl SourceSelector {
    pub fn new(budgets: SelectionBudgets) -> Self {
        Self { budgets }
    }

    pub fn budget_for(&self, tier: VolatilityTier) -> usize {
        match tier {
            VolatilityTier::High => self.budgets.high,
            VolatilityTier::Medium => self.budgets.medium,
            VolatilityTier::Low => self.budgets.low,
        }
    }

    /// Select up to the budget, preserving score-descending order. The
    /// budget is a ceiling, not a requirement.
    pub fn select(&self, scored: &[ScoredSource], tier: VolatilityTier) -> Vec<String> {
        let budget = self.budget_for(tier);
        let selected: Vec<String> = scored
            .iter()
            .take(budget)
            .map(|s| s.source_id.clone())
            .collect();

        debug!(
            tier = tier.as_str(),
            budget,
            candidates = scored.len(),
            selected = selected.len(),
            "Selected sources"
        );

        selected
    }
}
