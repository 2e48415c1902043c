//! Per-model pricing and process-wide cost ceiling.

use std::collections::HashMap;
use std::sync::Mutex;

/// Conservative fallback pricing (USD per million tokens) for a model with
/// no table entry and no prefix match.
const FALLBACK_INPUT_PER_MILLION: f64 = 5.0;
const FALLBACK_OUTPUT_PER_MILLION: f64 = 15.0;

/// Input/output dollars-per-million-tokens pricing for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// USD per million input tokens.
    pub input_per_million: f64,
    /// USD per million output tokens.
    pub output_per_million: f64,
}

impl ModelPricing {
    /// The fallback pricing applied when a model matches nothing in the table.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            input_per_million: FALLBACK_INPUT_PER_MILLION,
            output_per_million: FALLBACK_OUTPUT_PER_MILLION,
        }
    }
}

/// Immutable pricing table, declared as startup configuration.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    entries: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Build a table from explicit model -> pricing entries.
    #[must_use]
    pub fn new(entries: HashMap<String, ModelPricing>) -> Self {
        Self { entries }
    }

    /// Resolve pricing for `model`: exact match, then a prefix match in
    /// either direction (to tolerate versioned model names such as
    /// `claude-sonnet-4-20250514` against a table entry of `claude-sonnet`),
    /// then the conservative fallback.
    ///
    /// Prefix matching is whole-prefix only — it is not fuzzy matching.
    #[must_use]
    pub fn lookup(&self, model: &str) -> ModelPricing {
        if let Some(pricing) = self.entries.get(model) {
            return *pricing;
        }
        for (name, pricing) in &self.entries {
            if model.starts_with(name.as_str()) || name.starts_with(model) {
                return *pricing;
            }
        }
        ModelPricing::fallback()
    }

    /// A small built-in table for well-known models, used by
    /// [`crate::factory::GuardFactory`] when no explicit table is supplied.
    /// Anything not listed falls back to [`ModelPricing::fallback`].
    #[must_use]
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "claude-opus".to_string(),
            ModelPricing { input_per_million: 15.0, output_per_million: 75.0 },
        );
        entries.insert(
            "claude-sonnet".to_string(),
            ModelPricing { input_per_million: 3.0, output_per_million: 15.0 },
        );
        entries.insert(
            "claude-haiku".to_string(),
            ModelPricing { input_per_million: 0.8, output_per_million: 4.0 },
        );
        entries.insert(
            "gpt-4o".to_string(),
            ModelPricing { input_per_million: 2.5, output_per_million: 10.0 },
        );
        entries.insert(
            "gpt-4o-mini".to_string(),
            ModelPricing { input_per_million: 0.15, output_per_million: 0.6 },
        );
        Self::new(entries)
    }
}

/// Per-model pricing and a process-wide cost ceiling, in US cents.
///
/// A single mutex guards the cumulative total; `can_afford` and `record`
/// are both pure in-memory arithmetic with no suspension point.
pub struct CostEstimator {
    table: PricingTable,
    ceiling_cents: f64,
    cumulative_cents: Mutex<f64>,
}

impl CostEstimator {
    /// Build an estimator with the given pricing table and ceiling.
    /// `ceiling_cents == 0.0` means unlimited.
    #[must_use]
    pub fn new(table: PricingTable, ceiling_cents: f64) -> Self {
        Self {
            table,
            ceiling_cents,
            cumulative_cents: Mutex::new(0.0),
        }
    }

    /// Estimated cost in cents for `input_tokens`/`output_tokens` on `model`.
    #[must_use]
    pub fn estimate_cents(&self, model: &str, input_tokens: usize, output_tokens: usize) -> f64 {
        let pricing = self.table.lookup(model);
        let input_dollars = (input_tokens as f64 / 1_000_000.0) * pricing.input_per_million;
        let output_dollars = (output_tokens as f64 / 1_000_000.0) * pricing.output_per_million;
        (input_dollars + output_dollars) * 100.0
    }

    /// Whether the estimated cost for this call keeps the cumulative total
    /// within the ceiling. Always true when the ceiling is `0.0`.
    #[must_use]
    pub fn can_afford(&self, model: &str, est_input: usize, est_output: usize) -> bool {
        if self.ceiling_cents == 0.0 {
            return true;
        }
        let estimated = self.estimate_cents(model, est_input, est_output);
        let cumulative = *self
            .cumulative_cents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cumulative + estimated <= self.ceiling_cents
    }

    /// Record the actual cost of a completed call and return it in cents.
    pub fn record(&self, model: &str, actual_input: usize, actual_output: usize) -> f64 {
        let cost = self.estimate_cents(model, actual_input, actual_output);
        let mut cumulative = self
            .cumulative_cents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *cumulative += cost;
        cost
    }

    /// Total cost recorded so far, in cents.
    #[must_use]
    pub fn total_cost_cents(&self) -> f64 {
        *self
            .cumulative_cents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PricingTable {
        let mut entries = HashMap::new();
        entries.insert(
            "claude-sonnet".to_string(),
            ModelPricing {
                input_per_million: 3.0,
                output_per_million: 15.0,
            },
        );
        PricingTable::new(entries)
    }

    #[test]
    fn exact_match_wins() {
        let pricing = table().lookup("claude-sonnet");
        assert_eq!(pricing.input_per_million, 3.0);
    }

    #[test]
    fn versioned_name_prefix_matches() {
        let pricing = table().lookup("claude-sonnet-4-20250514");
        assert_eq!(pricing.input_per_million, 3.0);
    }

    #[test]
    fn table_entry_prefixing_query_also_matches() {
        let pricing = table().lookup("claude-son");
        assert_eq!(pricing.input_per_million, 3.0);
    }

    #[test]
    fn unknown_model_falls_back() {
        let pricing = table().lookup("some-unknown-model");
        assert_eq!(pricing, ModelPricing::fallback());
    }

    #[test]
    fn builtin_table_covers_known_model_families() {
        let builtin = PricingTable::builtin();
        assert_eq!(builtin.lookup("claude-sonnet-4-20250514").input_per_million, 3.0);
        assert_eq!(builtin.lookup("gpt-4o-mini").input_per_million, 0.15);
        assert_eq!(builtin.lookup("some-unlisted-model"), ModelPricing::fallback());
    }

    #[test]
    fn unlimited_ceiling_always_affords() {
        let estimator = CostEstimator::new(table(), 0.0);
        assert!(estimator.can_afford("claude-sonnet", 10_000_000, 10_000_000));
    }

    #[test]
    fn ceiling_blocks_once_exceeded() {
        let estimator = CostEstimator::new(table(), 1.0);
        estimator.record("claude-sonnet", 100_000, 100_000);
        assert!(!estimator.can_afford("claude-sonnet", 100_000, 100_000));
    }

    #[test]
    fn record_accumulates_and_returns_call_cost() {
        let estimator = CostEstimator::new(table(), 0.0);
        let cost_a = estimator.record("claude-sonnet", 1_000_000, 0);
        assert!((cost_a - 300.0).abs() < 1e-9);
        let cost_b = estimator.record("claude-sonnet", 0, 1_000_000);
        assert!((cost_b - 1_500.0).abs() < 1e-9);
        assert!((estimator.total_cost_cents() - 1_800.0).abs() < 1e-9);
    }

    #[test]
    fn record_order_is_commutative_within_float_error() {
        let a = CostEstimator::new(table(), 0.0);
        a.record("claude-sonnet", 1_000_000, 0);
        a.record("claude-sonnet", 0, 2_000_000);

        let b = CostEstimator::new(table(), 0.0);
        b.record("claude-sonnet", 0, 2_000_000);
        b.record("claude-sonnet", 1_000_000, 0);

        assert!((a.total_cost_cents() - b.total_cost_cents()).abs() < 1e-9);
    }
}
