//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document (or no file at
//! all) yields the stock behavior.

use serde::{Deserialize, Serialize};

use fabric_ml::ForestParams;

use crate::error::{EngineError, EngineResult};
use crate::price_estimator::DemandPolicy;
use crate::thresholds::LOW_STOCK_THRESHOLD;

/// Default fraction of waste rows held out for scoring.
pub const DEFAULT_HOLDOUT_FRACTION: f64 = 0.2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stock strictly below this is reported as low.
    pub low_stock_threshold: i64,
    pub forest: ForestParams,
    pub holdout_fraction: f64,
    pub demand_policy: DemandPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
            forest: ForestParams::default(),
            holdout_fraction: DEFAULT_HOLDOUT_FRACTION,
            demand_policy: DemandPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values training would choke on later.
    pub fn validate(&self) -> EngineResult<()> {
        if !(0.0..1.0).contains(&self.holdout_fraction) {
            return Err(EngineError::Config(format!(
                "holdout_fraction must be in [0, 1), got {}",
                self.holdout_fraction
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(EngineError::Config("forest.n_estimators must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.low_stock_threshold, 100);
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.forest.max_depth, None);
        assert_eq!(config.holdout_fraction, 0.2);
        assert_eq!(config.demand_policy, DemandPolicy::Ratio);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"low_stock_threshold": 50, "forest": {"n_estimators": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.low_stock_threshold, 50);
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.holdout_fraction, 0.2);
    }

    #[test]
    fn override_policy_from_document() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"demand_policy": {"mode": "override", "high": ["cotton"], "low": ["wool"]}}"#,
        )
        .unwrap();
        match config.demand_policy {
            DemandPolicy::Override { high, low } => {
                assert_eq!(high, vec!["cotton".to_string()]);
                assert_eq!(low, vec!["wool".to_string()]);
            }
            other => panic!("unexpected policy {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_holdout() {
        let config = EngineConfig {
            holdout_fraction: 1.0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }
}
