//! Validator thresholds.
//!
//! Defaults are the values the strategy editor ships with. Hosts may load an
//! override from JSON; any field left out keeps its default.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorConfig {
    /// Inclusive lower bound for an indicator's lookback period.
    pub min_period: f64,
    /// Inclusive upper bound for an indicator's lookback period.
    pub max_period: f64,
    /// Periods above this raise a `long_lookback_period` warning.
    pub long_lookback_period: f64,
    /// Periods above this add the heavy-indicator weight to the complexity score.
    pub heavy_indicator_period: f64,
    /// Upper bound (inclusive) for a risk node's `maxLoss` percentage.
    pub max_loss_ceiling: f64,
    pub complexity_threshold: u64,
    pub max_logic_depth: usize,
    pub max_indicators: usize,
    /// Default declared input count for logic gates without an `inputs` parameter.
    pub default_logic_inputs: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            min_period: 1.0,
            max_period: 500.0,
            long_lookback_period: 200.0,
            heavy_indicator_period: 50.0,
            max_loss_ceiling: 100.0,
            complexity_threshold: 1000,
            max_logic_depth: 5,
            max_indicators: 8,
            default_logic_inputs: 2,
        }
    }
}

impl ValidatorConfig {
    pub fn from_json(json: &str) -> Result<Self, crate::error::ValidatorError> {
        serde_json::from_str(json).map_err(|e| {
            crate::error::ValidatorError::malformed(format!("invalid validator config: {}", e))
        })
    }
}
