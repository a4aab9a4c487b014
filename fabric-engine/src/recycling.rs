//! Recycling decision engine.
//!
//! A query runs three stages:
//! 1. Lookup: find the fabric's waste record (case-insensitive, trimmed)
//! 2. Predict: ask the disposal predictor for a method label
//! 3. Rule tree: branch on biodegradability, then on the predicted method
//!
//! The rule tree only has method-specific steps for Composting and
//! Chemical Recycling under biodegradable fabrics, and for Mechanical
//! Recycling and Incineration otherwise. A prediction outside the
//! fabric's branch yields the generic steps only; the guide is marked
//! `Uncovered` and a warning is logged.

use std::sync::Arc;

use crate::dataset::FabricWasteTable;
use crate::disposal_model::DisposalPredictor;
use crate::error::{EngineError, EngineResult};
use crate::types::{DisposalMethod, RecyclingGuide, RuleCoverage};
use crate::util::normalize_key;

pub const STEP_COLLECT: &str = "Step 1: Collect and separate clean fabric waste.";
pub const STEP_UPCYCLE: &str =
    "Step 2: If reusable, send for upcycling (convert into rags, bags, stuffing).";
pub const STEP_COMPOST: &str =
    "Step 3: If not reusable, send for composting (fabric decomposes naturally).";
pub const STEP_CHEMICAL: &str =
    "Step 3: Process through chemical recycling to extract reusable fibers.";
pub const STEP_SHRED: &str = "Step 2: Shred and process the fabric into recycled fibers.";
pub const STEP_CONVERT: &str = "Step 3: Convert into new fabric materials for reuse.";
pub const STEP_INCINERATE: &str =
    "Step 2: If no recycling options are available, dispose of through incineration.";

/// Header line naming the fabric as the caller wrote it.
pub fn header(fabric_name: &str) -> String {
    format!("Recycling Guide for {}", fabric_name)
}

/// Explanation returned in place of a guide for unknown fabrics.
pub fn not_found_message(fabric_name: &str) -> String {
    format!(
        "Sorry, recycling information for '{}' is not available.",
        fabric_name
    )
}

/// The deterministic rule tree. Returns the numbered steps (without the
/// header) and whether the method had a branch for this biodegradability.
pub fn rule_steps(biodegradable: bool, method: &DisposalMethod) -> (Vec<&'static str>, RuleCoverage) {
    let mut steps = vec![STEP_COLLECT];
    let coverage = if biodegradable {
        steps.push(STEP_UPCYCLE);
        match method {
            DisposalMethod::Composting => {
                steps.push(STEP_COMPOST);
                RuleCoverage::Covered
            }
            DisposalMethod::ChemicalRecycling => {
                steps.push(STEP_CHEMICAL);
                RuleCoverage::Covered
            }
            _ => RuleCoverage::Uncovered,
        }
    } else {
        match method {
            DisposalMethod::MechanicalRecycling => {
                steps.push(STEP_SHRED);
                steps.push(STEP_CONVERT);
                RuleCoverage::Covered
            }
            DisposalMethod::Incineration => {
                steps.push(STEP_INCINERATE);
                RuleCoverage::Covered
            }
            _ => RuleCoverage::Uncovered,
        }
    };
    (steps, coverage)
}

pub struct RecyclingEngine {
    waste: Arc<FabricWasteTable>,
    predictor: Arc<dyn DisposalPredictor>,
}

impl RecyclingEngine {
    pub fn new(waste: Arc<FabricWasteTable>, predictor: Arc<dyn DisposalPredictor>) -> Self {
        Self { waste, predictor }
    }

    /// Build the disposal guide for a fabric.
    pub fn guide(&self, fabric_name: &str) -> EngineResult<RecyclingGuide> {
        let name = fabric_name.trim();
        let record = self
            .waste
            .find(name)
            .ok_or_else(|| EngineError::FabricNotFound(normalize_key(name)))?;

        let method = self.predictor.predict_method(record)?;
        let biodegradable = record.is_biodegradable();
        let (rule, coverage) = rule_steps(biodegradable, &method);

        if coverage == RuleCoverage::Uncovered {
            log::warn!(
                "no rule branch for fabric={} biodegradable={} predicted_method={}; emitting generic steps only",
                record.fabric,
                biodegradable,
                method
            );
        }

        let mut steps = Vec::with_capacity(rule.len() + 1);
        steps.push(header(name));
        steps.extend(rule.into_iter().map(String::from));

        Ok(RecyclingGuide {
            fabric: record.fabric.clone(),
            biodegradable,
            disposal_method: method,
            steps,
            coverage,
        })
    }
}
