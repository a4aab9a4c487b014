//! Dashboard summary over the stock and demand tables.

use std::collections::HashSet;

use crate::dataset::{DemandTable, StockTable};
use crate::error::{EngineError, EngineResult};
use crate::thresholds::HIGH_DEMAND_RATIO;
use crate::types::{InventorySummary, StockDetails};

/// Stock lookup: price, stock and unit for a fabric.
pub fn stock_details(stock: &StockTable, fabric: &str) -> EngineResult<StockDetails> {
    stock
        .get(fabric)
        .map(StockDetails::from)
        .ok_or_else(|| EngineError::FabricNotFound(fabric.trim().to_lowercase()))
}

/// Totals, low-stock fabrics and high-demand demand rows.
///
/// High demand here is the ratio rule alone; deployment overrides only
/// apply to price predictions.
pub fn inventory_summary(
    stock: &StockTable,
    demand: &DemandTable,
    low_stock_threshold: i64,
) -> InventorySummary {
    let total_fabrics = stock
        .records()
        .iter()
        .map(|r| r.fabric_type.as_str())
        .collect::<HashSet<_>>()
        .len();
    let current_inventory = stock.records().iter().map(|r| r.stock_available).sum();

    let low_stock_names: Vec<String> = stock
        .records()
        .iter()
        .filter(|r| r.stock_available < low_stock_threshold)
        .map(|r| r.fabric_type.clone())
        .collect();

    let high_demand_names: Vec<String> = demand
        .records()
        .iter()
        .filter(|r| r.current_demand > r.historical_demand * HIGH_DEMAND_RATIO)
        .map(|r| r.fabric_type.clone())
        .collect();

    InventorySummary {
        total_fabrics,
        current_inventory,
        low_stock_count: low_stock_names.len(),
        low_stock_names,
        high_demand_count: high_demand_names.len(),
        high_demand_names,
    }
}
