//! Per-fabric price estimation.
//!
//! Every call fits a fresh linear regression of unit price on
//! (historical demand, current demand) over that fabric's demand rows
//! only. Nothing is cached between calls: each fabric's fit is isolated
//! and always reflects the current table.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use fabric_ml::math::round_to;
use fabric_ml::LinearRegression;

use crate::dataset::DemandTable;
use crate::error::{EngineError, EngineResult};
use crate::thresholds::{HIGH_DEMAND_RATIO, LOW_DEMAND_RATIO, PRICE_DIGITS};
use crate::types::{DemandStatus, PricePrediction};
use crate::util::normalize_key;

/// How demand status is decided for a deployment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DemandPolicy {
    /// Three-way ratio rule only.
    #[default]
    Ratio,
    /// Fixed fabric lists checked first (high, then low); fabrics in
    /// neither list fall back to the ratio rule.
    Override {
        #[serde(default)]
        high: Vec<String>,
        #[serde(default)]
        low: Vec<String>,
    },
}

impl DemandPolicy {
    /// Regional market lists for cotton/silk/denim/polyester (high) and
    /// wool/linen/rayon (low).
    pub fn regional_override() -> Self {
        DemandPolicy::Override {
            high: ["cotton", "silk", "denim", "polyester"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            low: ["wool", "linen", "rayon"].iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn status(&self, fabric: &str, historical: f64, current: f64) -> DemandStatus {
        if let DemandPolicy::Override { high, low } = self {
            let key = normalize_key(fabric);
            if high.iter().any(|f| normalize_key(f) == key) {
                return DemandStatus::High;
            }
            if low.iter().any(|f| normalize_key(f) == key) {
                return DemandStatus::Low;
            }
        }
        ratio_status(historical, current)
    }
}

/// High above 1.25x historical, low below 0.75x, stable otherwise.
/// Both bounds are strict, so exactly 1.25x or 0.75x is stable.
pub fn ratio_status(historical: f64, current: f64) -> DemandStatus {
    if current > historical * HIGH_DEMAND_RATIO {
        DemandStatus::High
    } else if current < historical * LOW_DEMAND_RATIO {
        DemandStatus::Low
    } else {
        DemandStatus::Stable
    }
}

pub struct PriceEstimator {
    demand: Arc<DemandTable>,
    policy: DemandPolicy,
}

impl PriceEstimator {
    pub fn new(demand: Arc<DemandTable>, policy: DemandPolicy) -> Self {
        Self { demand, policy }
    }

    /// Fit price ~ (historical, current) over one fabric's demand rows.
    pub fn fit(&self, fabric: &str) -> EngineResult<LinearRegression> {
        let rows = self.demand.rows_for(fabric);
        if rows.is_empty() {
            return Err(EngineError::FabricNotFound(normalize_key(fabric)));
        }
        let x = Array2::from_shape_fn((rows.len(), 2), |(i, j)| {
            if j == 0 {
                rows[i].historical_demand
            } else {
                rows[i].current_demand
            }
        });
        let y: Array1<f64> = rows.iter().map(|r| r.price_per_unit).collect();
        Ok(LinearRegression::fit(&x, &y)?)
    }

    /// Predict the unit price at the given demand levels.
    pub fn estimate(
        &self,
        fabric: &str,
        historical_demand: f64,
        current_demand: f64,
    ) -> EngineResult<PricePrediction> {
        let model = self.fit(fabric)?;
        let price = model.predict(&[historical_demand, current_demand])?;
        Ok(PricePrediction {
            predicted_price: round_to(price, PRICE_DIGITS),
            demand_status: self
                .policy
                .status(fabric, historical_demand, current_demand),
        })
    }

    /// Predict at the fabric's first demand row, the query point used when
    /// only a fabric name is supplied.
    pub fn predict(&self, fabric: &str) -> EngineResult<PricePrediction> {
        let (historical, current) = self
            .demand
            .rows_for(fabric)
            .first()
            .map(|r| (r.historical_demand, r.current_demand))
            .ok_or_else(|| EngineError::FabricNotFound(normalize_key(fabric)))?;
        self.estimate(fabric, historical, current)
    }

    pub fn policy(&self) -> &DemandPolicy {
        &self.policy
    }
}
