//! Response payloads, one shape per operation outcome.

use serde::Serialize;

use fabric_engine::sensor::TelemetryView;
use fabric_engine::{
    DisposalMethod, InventorySummary, PricePrediction, RecyclingGuide, RuleCoverage, StockDetails,
};

/// Message returned when a stock or price query names an unknown fabric.
pub const FABRIC_NOT_FOUND: &str = "Fabric not found";

/// Recycling guide as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecyclingPayload {
    /// Header and steps joined one per line.
    pub recycling_info: String,
    pub steps: Vec<String>,
    pub disposal_method: DisposalMethod,
    pub coverage: RuleCoverage,
}

impl From<RecyclingGuide> for RecyclingPayload {
    fn from(guide: RecyclingGuide) -> Self {
        Self {
            recycling_info: guide.to_text(),
            steps: guide.steps,
            disposal_method: guide.disposal_method,
            coverage: guide.coverage,
        }
    }
}

/// Result body of a handled request. Serialized without a tag; each
/// variant has a distinct set of top-level keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Stock(StockDetails),
    Price(PricePrediction),
    Recommendations { recommendations: Vec<String> },
    Recycling(RecyclingPayload),
    /// Unknown fabric for a recycling query.
    RecyclingUnavailable { recycling_info: String },
    Inventory(InventorySummary),
    Telemetry(TelemetryView),
    Error { error: String },
}

impl OperationResult {
    pub fn not_found() -> Self {
        OperationResult::Error {
            error: FABRIC_NOT_FOUND.to_string(),
        }
    }

    /// Error text carried in the payload, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            OperationResult::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// A full response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub result: OperationResult,
}
