//! Request parsing, dispatch and audit.
//!
//! 1. Raw JSON -> FabricOperation (reject if unknown)
//! 2. Validate parameters (reject empty fabric names)
//! 3. Dispatch to the engine or the sensor hub
//! 4. Format the response payload
//! 5. Append an audit entry

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

use fabric_engine::recommendation::is_no_results;
use fabric_engine::recycling::not_found_message;
use fabric_engine::{FabricEngine, SensorHub};

use crate::error::{BridgeError, BridgeResult};
use crate::ops::FabricOperation;
use crate::response::{BridgeResponse, OperationResult};

/// Audit entries kept before the oldest are dropped.
pub const DEFAULT_MAX_AUDIT_ENTRIES: usize = 10_000;

/// A parsed and validated request.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRequest {
    pub operation: FabricOperation,
    pub request_id: String,
}

/// One handled (or rejected) request.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
    pub request_id: String,
    pub operation: String,
    pub success: bool,
    pub error: Option<String>,
}

pub struct Bridge {
    engine: Arc<FabricEngine>,
    sensors: Arc<SensorHub>,
    audit_log: VecDeque<AuditEntry>,
    pub max_audit_entries: usize,
    step: u64,
}

impl Bridge {
    pub fn new(engine: Arc<FabricEngine>, sensors: Arc<SensorHub>) -> Self {
        Bridge {
            engine,
            sensors,
            audit_log: VecDeque::new(),
            max_audit_entries: DEFAULT_MAX_AUDIT_ENTRIES,
            step: 0,
        }
    }

    /// Parse a raw JSON request of the form
    /// `{"op": ..., "params": {...}, "request_id": ...}`.
    ///
    /// `request_id` is optional; a sequence-based id is assigned when it
    /// is absent.
    pub fn parse_request(&self, raw_json: &str) -> BridgeResult<BridgeRequest> {
        let mut value: serde_json::Value = serde_json::from_str(raw_json).map_err(|e| {
            BridgeError::UnknownOperation(format!("Failed to parse request: {}", e))
        })?;

        let request_id = value
            .as_object_mut()
            .and_then(|map| map.remove("request_id"))
            .and_then(|id| id.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("req-{}", self.step + 1));

        let operation: FabricOperation = serde_json::from_value(value).map_err(|e| {
            BridgeError::UnknownOperation(format!("Failed to parse request: {}", e))
        })?;

        self.validate_operation(&operation)?;

        Ok(BridgeRequest {
            operation,
            request_id,
        })
    }

    fn validate_operation(&self, op: &FabricOperation) -> BridgeResult<()> {
        if let Some(fabric) = op.fabric() {
            if fabric.trim().is_empty() {
                return Err(BridgeError::InvalidParameter {
                    op: op.name().into(),
                    reason: "No fabric provided".into(),
                });
            }
        }
        Ok(())
    }

    /// Execute a validated request and record it.
    pub fn process(&mut self, request: &BridgeRequest) -> BridgeResult<BridgeResponse> {
        let result = self.dispatch(&request.operation);

        let error = match &result {
            Ok(payload) => payload.error_message().map(str::to_string),
            Err(e) => Some(e.to_string()),
        };
        let success = error.is_none();
        self.record(
            request.request_id.clone(),
            request.operation.describe(),
            success,
            error,
        );

        Ok(BridgeResponse {
            request_id: Some(request.request_id.clone()),
            result: result?,
        })
    }

    /// Parse, execute and serialize in one step. Always yields a JSON
    /// object; failures become `{"error": ...}`.
    pub fn handle(&mut self, raw_json: &str) -> String {
        let response = match self.parse_request(raw_json) {
            Ok(request) => match self.process(&request) {
                Ok(response) => response,
                Err(e) => {
                    log::error!("request_id={} failed: {}", request.request_id, e);
                    error_response(Some(request.request_id), &e)
                }
            },
            Err(e) => {
                log::warn!("rejected request: {}", e);
                self.record(
                    format!("req-{}", self.step + 1),
                    "Rejected request".into(),
                    false,
                    Some(e.to_string()),
                );
                error_response(None, &e)
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            log::error!("failed to serialize response: {}", e);
            r#"{"error":"Serialization error"}"#.to_string()
        })
    }

    fn dispatch(&self, op: &FabricOperation) -> BridgeResult<OperationResult> {
        let engine = &self.engine;
        match op {
            FabricOperation::StockLookup { fabric } => match engine.stock(fabric) {
                Ok(details) => Ok(OperationResult::Stock(details)),
                Err(e) if e.is_not_found() => Ok(OperationResult::not_found()),
                Err(e) => Err(e.into()),
            },
            FabricOperation::PredictPrice { fabric } => match engine.predict_price(fabric) {
                Ok(prediction) => Ok(OperationResult::Price(prediction)),
                Err(e) if e.is_not_found() => Ok(OperationResult::not_found()),
                Err(e) => Err(e.into()),
            },
            FabricOperation::Recommend {
                season,
                occasion,
                budget,
            } => {
                let recommendations = engine.recommend(season, occasion, budget);
                if is_no_results(&recommendations) {
                    log::debug!(
                        "no recommendations for season={} occasion={} budget={}",
                        season,
                        occasion,
                        budget
                    );
                }
                Ok(OperationResult::Recommendations { recommendations })
            }
            FabricOperation::RecyclingSteps { fabric } => match engine.recycling_guide(fabric) {
                Ok(guide) => Ok(OperationResult::Recycling(guide.into())),
                Err(e) if e.is_not_found() => Ok(OperationResult::RecyclingUnavailable {
                    recycling_info: not_found_message(fabric.trim()),
                }),
                Err(e) => Err(e.into()),
            },
            FabricOperation::InventorySummary => {
                Ok(OperationResult::Inventory(engine.inventory_summary()))
            }
            FabricOperation::Telemetry => Ok(OperationResult::Telemetry(self.sensors.view())),
        }
    }

    fn record(&mut self, request_id: String, operation: String, success: bool, error: Option<String>) {
        self.step += 1;
        log::debug!(
            "audit seq={} request_id={} op=\"{}\" success={}",
            self.step,
            request_id,
            operation,
            success
        );
        if self.audit_log.len() >= self.max_audit_entries {
            self.audit_log.pop_front();
        }
        self.audit_log.push_back(AuditEntry {
            timestamp: Utc::now(),
            sequence: self.step,
            request_id,
            operation,
            success,
            error,
        });
    }

    pub fn audit_log(&self) -> impl Iterator<Item = &AuditEntry> {
        self.audit_log.iter()
    }

    pub fn audit_len(&self) -> usize {
        self.audit_log.len()
    }
}

fn error_response(request_id: Option<String>, error: &BridgeError) -> BridgeResponse {
    BridgeResponse {
        request_id,
        result: OperationResult::Error {
            error: error.client_message(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_engine::dataset::{load_demand, load_fabric_waste, load_stock};
    use fabric_engine::{Datasets, DemandTable, EngineConfig, FabricWasteTable, StockTable};
    use serde_json::Value;

    const STOCK_CSV: &str = "\
Fabric Type,Price per Unit,Stock Available,Unit Type
Cotton,120,500,meter
Silk,450,80,meter
";

    const DEMAND_CSV: &str = "\
Fabric Type,Season,Occasion,Budget Category,Historical Demand,Current Demand,Price per Unit
Cotton,Summer,Casual,Low,100,130,100
Cotton,Winter,Party,High,200,150,160
Cotton,All-Season,Casual,Medium,150,160,132.5
Silk,All-Season,Formal,High,70,90,520
";

    const WASTE_CSV: &str = "\
Fabric,Biodegradable,Recyclable,Monthly_Waste_kg,Annual_Trend,Disposal Method
Cotton,Yes,Yes,120,2.5,Composting
Linen,Yes,Yes,80,1.5,Composting
Hemp,Yes,Yes,60,1.0,Composting
Jute,Yes,Yes,95,2.0,Composting
Bamboo,Yes,Yes,70,1.8,Composting
Polyester,No,Yes,640,6.1,Mechanical Recycling
Nylon,No,Yes,610,5.8,Mechanical Recycling
Acrylic,No,Yes,660,6.4,Mechanical Recycling
Spandex,No,Yes,625,5.9,Mechanical Recycling
";

    fn make_bridge() -> Bridge {
        let datasets = Datasets::new(
            StockTable::new(load_stock(STOCK_CSV.as_bytes()).unwrap()).unwrap(),
            DemandTable::new(load_demand(DEMAND_CSV.as_bytes()).unwrap()).unwrap(),
            FabricWasteTable::new(load_fabric_waste(WASTE_CSV.as_bytes()).unwrap()),
        );
        let engine = FabricEngine::startup(datasets, EngineConfig::default()).unwrap();
        Bridge::new(Arc::new(engine), Arc::new(SensorHub::new()))
    }

    fn call(bridge: &mut Bridge, raw: &str) -> Value {
        serde_json::from_str(&bridge.handle(raw)).unwrap()
    }

    #[test]
    fn test_parse_valid_request() {
        let bridge = make_bridge();
        let req = bridge
            .parse_request(r#"{"op": "InventorySummary", "request_id": "req-abc"}"#)
            .unwrap();
        assert_eq!(req.operation, FabricOperation::InventorySummary);
        assert_eq!(req.request_id, "req-abc");
    }

    #[test]
    fn test_reject_invalid_json() {
        let bridge = make_bridge();
        assert!(matches!(
            bridge.parse_request("not json at all"),
            Err(BridgeError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_blank_fabric_rejected() {
        let mut bridge = make_bridge();
        let resp = call(&mut bridge, r#"{"op": "StockLookup", "params": {"fabric": "  "}}"#);
        assert_eq!(resp["error"], "No fabric provided");
        assert_eq!(bridge.audit_len(), 1);
        assert!(!bridge.audit_log().next().unwrap().success);
    }

    #[test]
    fn test_stock_lookup_and_not_found() {
        let mut bridge = make_bridge();
        let resp = call(&mut bridge, r#"{"op": "StockLookup", "params": {"fabric": "Silk"}}"#);
        assert_eq!(resp["price"], 450.0);
        assert_eq!(resp["stock"], 80);
        assert_eq!(resp["unit"], "meter");

        let resp = call(&mut bridge, r#"{"op": "StockLookup", "params": {"fabric": "velvet"}}"#);
        assert_eq!(resp["error"], "Fabric not found");
    }

    #[test]
    fn test_price_payload_keys() {
        let mut bridge = make_bridge();
        let resp = call(&mut bridge, r#"{"op": "PredictPrice", "params": {"fabric": "cotton"}}"#);
        assert_eq!(resp["predicted_price"], 100.0);
        assert_eq!(resp["demand_status"], "High Demand");
    }

    #[test]
    fn test_recommend_falls_back() {
        let mut bridge = make_bridge();
        let resp = call(
            &mut bridge,
            r#"{"op": "Recommend", "params": {"season": "winter", "occasion": "formal", "budget": "high"}}"#,
        );
        assert_eq!(resp["recommendations"], serde_json::json!(["silk"]));
    }

    #[test]
    fn test_recommend_without_matches_returns_sentinel() {
        let mut bridge = make_bridge();
        let resp = call(
            &mut bridge,
            r#"{"op": "Recommend", "params": {"season": "monsoon", "occasion": "party", "budget": "low"}}"#,
        );
        let recs: Vec<String> = serde_json::from_value(resp["recommendations"].clone()).unwrap();
        assert!(is_no_results(&recs));
        assert!(bridge.audit_log().next().unwrap().success);
    }

    #[test]
    fn test_recycling_payload_and_unknown() {
        let mut bridge = make_bridge();
        let resp = call(&mut bridge, r#"{"op": "RecyclingSteps", "params": {"fabric": "Cotton"}}"#);
        assert_eq!(resp["disposal_method"], "Composting");
        assert_eq!(resp["coverage"], "Covered");
        assert_eq!(resp["steps"].as_array().unwrap().len(), 4);
        assert!(resp["recycling_info"]
            .as_str()
            .unwrap()
            .starts_with("Recycling Guide for Cotton\nStep 1:"));

        let resp = call(&mut bridge, r#"{"op": "RecyclingSteps", "params": {"fabric": " Velvet "}}"#);
        assert_eq!(resp["recycling_info"], not_found_message("Velvet"));
    }

    #[test]
    fn test_audit_marks_payload_errors_failed() {
        let mut bridge = make_bridge();
        call(&mut bridge, r#"{"op": "PredictPrice", "params": {"fabric": "velvet"}}"#);
        call(&mut bridge, r#"{"op": "RecyclingSteps", "params": {"fabric": "Cotton"}}"#);

        let entries: Vec<&AuditEntry> = bridge.audit_log().collect();
        assert!(!entries[0].success);
        assert!(entries[0].error.is_some());
        assert!(entries[1].success);
        assert!(entries[1].error.is_none());
    }

    #[test]
    fn test_telemetry_before_any_reading() {
        let mut bridge = make_bridge();
        let resp = call(&mut bridge, r#"{"op": "Telemetry"}"#);
        assert_eq!(resp["connected"], false);
        assert_eq!(resp["temperature"], 0.0);
        assert_eq!(resp["mq3_value"], 0);
    }

    #[test]
    fn test_audit_log_populated() {
        let mut bridge = make_bridge();
        call(&mut bridge, r#"{"op": "InventorySummary", "request_id": "a"}"#);
        call(&mut bridge, r#"{"op": "StockLookup", "params": {"fabric": "velvet"}}"#);
        call(&mut bridge, r#"{"op": "Nope"}"#);

        let entries: Vec<&AuditEntry> = bridge.audit_log().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].request_id, "a");
        assert!(entries[0].success);
        assert!(!entries[1].success);
        assert_eq!(entries[1].error.as_deref(), Some("Fabric not found"));
        assert!(!entries[2].success);
        assert_eq!(
            entries.iter().map(|e| e.sequence).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_audit_log_is_bounded() {
        let mut bridge = make_bridge();
        bridge.max_audit_entries = 2;
        for _ in 0..5 {
            call(&mut bridge, r#"{"op": "Telemetry"}"#);
        }
        assert_eq!(bridge.audit_len(), 2);
        assert_eq!(bridge.audit_log().next().unwrap().sequence, 4);
    }
}
