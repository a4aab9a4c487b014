use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::parse_flag;

// ---------------------------------------------------------------------------
// Dataset rows
// ---------------------------------------------------------------------------

/// One row of the stock table. `fabric_type` is unique within the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(rename = "Fabric Type")]
    pub fabric_type: String,
    #[serde(rename = "Price per Unit")]
    pub price_per_unit: f64,
    #[serde(rename = "Stock Available")]
    pub stock_available: i64,
    #[serde(rename = "Unit Type")]
    pub unit_type: String,
}

/// One row of the demand table: a fabric under a season/occasion/budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    #[serde(rename = "Fabric Type")]
    pub fabric_type: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Occasion")]
    pub occasion: String,
    #[serde(rename = "Budget Category")]
    pub budget_category: String,
    #[serde(rename = "Historical Demand")]
    pub historical_demand: f64,
    #[serde(rename = "Current Demand")]
    pub current_demand: f64,
    #[serde(rename = "Price per Unit")]
    pub price_per_unit: f64,
}

/// One row of the fabric waste table. Categorical columns keep their raw
/// labels; the disposal model owns the encoders that turn them into codes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FabricWasteRecord {
    #[serde(rename = "Fabric")]
    pub fabric: String,
    #[serde(rename = "Biodegradable")]
    pub biodegradable: String,
    #[serde(rename = "Recyclable")]
    pub recyclable: String,
    #[serde(rename = "Monthly_Waste_kg")]
    pub monthly_waste_kg: f64,
    #[serde(rename = "Annual_Trend")]
    pub annual_trend: f64,
    #[serde(rename = "Disposal Method")]
    pub disposal_method: String,
}

impl FabricWasteRecord {
    /// Unrecognised labels count as not biodegradable.
    pub fn is_biodegradable(&self) -> bool {
        parse_flag(&self.biodegradable).unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Disposal methods
// ---------------------------------------------------------------------------

/// Disposal method predicted for a fabric.
///
/// The label set comes from the dataset; only these four have rule-tree
/// branches. Anything else is carried through as `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisposalMethod {
    Composting,
    ChemicalRecycling,
    MechanicalRecycling,
    Incineration,
    Other(String),
}

impl DisposalMethod {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Composting" => DisposalMethod::Composting,
            "Chemical Recycling" => DisposalMethod::ChemicalRecycling,
            "Mechanical Recycling" => DisposalMethod::MechanicalRecycling,
            "Incineration" => DisposalMethod::Incineration,
            other => DisposalMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisposalMethod::Composting => write!(f, "Composting"),
            DisposalMethod::ChemicalRecycling => write!(f, "Chemical Recycling"),
            DisposalMethod::MechanicalRecycling => write!(f, "Mechanical Recycling"),
            DisposalMethod::Incineration => write!(f, "Incineration"),
            DisposalMethod::Other(label) => write!(f, "{}", label),
        }
    }
}

/// Serializes as the dataset label, e.g. `"Chemical Recycling"`.
impl Serialize for DisposalMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// Stock lookup result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StockDetails {
    pub price: f64,
    pub stock: i64,
    pub unit: String,
}

impl From<&StockRecord> for StockDetails {
    fn from(r: &StockRecord) -> Self {
        Self {
            price: r.price_per_unit,
            stock: r.stock_available,
            unit: r.unit_type.clone(),
        }
    }
}

/// Demand trend relative to historical demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DemandStatus {
    #[serde(rename = "High Demand")]
    High,
    #[serde(rename = "Low Demand")]
    Low,
    #[serde(rename = "Stable Demand")]
    Stable,
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemandStatus::High => write!(f, "High Demand"),
            DemandStatus::Low => write!(f, "Low Demand"),
            DemandStatus::Stable => write!(f, "Stable Demand"),
        }
    }
}

/// Price prediction result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricePrediction {
    /// Rounded to two decimal digits.
    pub predicted_price: f64,
    pub demand_status: DemandStatus,
}

/// Whether the rule tree had a method-specific branch for the prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RuleCoverage {
    Covered,
    /// The prediction fell outside the branches for this fabric's
    /// biodegradability; only the generic steps were emitted.
    Uncovered,
}

/// Ordered disposal instructions for one fabric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecyclingGuide {
    pub fabric: String,
    pub biodegradable: bool,
    pub disposal_method: DisposalMethod,
    /// Header line followed by the numbered steps.
    pub steps: Vec<String>,
    pub coverage: RuleCoverage,
}

impl RecyclingGuide {
    /// Steps joined one per line.
    pub fn to_text(&self) -> String {
        self.steps.join("\n")
    }
}

/// Dashboard summary across the stock and demand tables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_fabrics: usize,
    pub current_inventory: i64,
    pub low_stock_count: usize,
    pub low_stock_names: Vec<String>,
    pub high_demand_count: usize,
    pub high_demand_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposal_labels_round_trip_through_display() {
        for label in [
            "Composting",
            "Chemical Recycling",
            "Mechanical Recycling",
            "Incineration",
            "Landfill",
        ] {
            assert_eq!(DisposalMethod::from_label(label).to_string(), label);
        }
        assert_eq!(
            DisposalMethod::from_label("Landfill"),
            DisposalMethod::Other("Landfill".into())
        );
    }

    #[test]
    fn demand_status_serializes_as_label() {
        let json = serde_json::to_string(&DemandStatus::Stable).unwrap();
        assert_eq!(json, "\"Stable Demand\"");
    }
}
