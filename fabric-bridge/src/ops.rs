//! The complete set of requests a client may send.
//!
//! A request that does not parse into one of these variants is rejected
//! before anything touches the engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "params")]
pub enum FabricOperation {
    /// Price, stock and unit for one fabric.
    StockLookup {
        #[serde(default)]
        fabric: String,
    },

    /// Regression price at the fabric's first demand row.
    PredictPrice {
        #[serde(default)]
        fabric: String,
    },

    /// Fabrics for a season/occasion/budget combination.
    Recommend {
        #[serde(default)]
        season: String,
        #[serde(default)]
        occasion: String,
        #[serde(default)]
        budget: String,
    },

    /// Disposal guide from the classifier and rule tree.
    RecyclingSteps {
        #[serde(default)]
        fabric: String,
    },

    InventorySummary,

    /// Latest sensor snapshot and connectivity.
    Telemetry,
}

impl FabricOperation {
    /// Variant name as it appears in the `op` field.
    pub fn name(&self) -> &'static str {
        match self {
            FabricOperation::StockLookup { .. } => "StockLookup",
            FabricOperation::PredictPrice { .. } => "PredictPrice",
            FabricOperation::Recommend { .. } => "Recommend",
            FabricOperation::RecyclingSteps { .. } => "RecyclingSteps",
            FabricOperation::InventorySummary => "InventorySummary",
            FabricOperation::Telemetry => "Telemetry",
        }
    }

    /// The fabric parameter, for operations that take one.
    pub fn fabric(&self) -> Option<&str> {
        match self {
            FabricOperation::StockLookup { fabric }
            | FabricOperation::PredictPrice { fabric }
            | FabricOperation::RecyclingSteps { fabric } => Some(fabric),
            _ => None,
        }
    }

    /// Short description for the audit log.
    pub fn describe(&self) -> String {
        match self {
            FabricOperation::StockLookup { fabric } => format!("Stock lookup for '{fabric}'"),
            FabricOperation::PredictPrice { fabric } => format!("Price prediction for '{fabric}'"),
            FabricOperation::Recommend {
                season,
                occasion,
                budget,
            } => format!("Recommend for {season}/{occasion}/{budget}"),
            FabricOperation::RecyclingSteps { fabric } => {
                format!("Recycling steps for '{fabric}'")
            }
            FabricOperation::InventorySummary => "Inventory summary".into(),
            FabricOperation::Telemetry => "Sensor telemetry".into(),
        }
    }
}
