//! CSV dataset provisioning.
//!
//! Parses the three textile tables into typed rows. Headers and values are
//! whitespace-trimmed and fabric identifiers lowercased before any lookup.
//! Expected CSV columns:
//!   stock:  Fabric Type, Price per Unit, Stock Available, Unit Type
//!   demand: Fabric Type, Season, Occasion, Budget Category,
//!           Historical Demand, Current Demand, Price per Unit
//!   waste:  Fabric, Biodegradable, Recyclable, Monthly_Waste_kg,
//!           Annual_Trend, Disposal Method
//! Extra columns are ignored.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::thresholds::NO_RECOMMENDATIONS;
use crate::types::{DemandRecord, FabricWasteRecord, StockRecord};
use crate::util::normalize_key;

const STOCK_COLUMNS: &[&str] = &["Fabric Type", "Price per Unit", "Stock Available", "Unit Type"];
const DEMAND_COLUMNS: &[&str] = &[
    "Fabric Type",
    "Season",
    "Occasion",
    "Budget Category",
    "Historical Demand",
    "Current Demand",
    "Price per Unit",
];
const WASTE_COLUMNS: &[&str] = &[
    "Fabric",
    "Biodegradable",
    "Recyclable",
    "Monthly_Waste_kg",
    "Annual_Trend",
    "Disposal Method",
];

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Stock rows indexed by fabric type.
#[derive(Clone, Debug)]
pub struct StockTable {
    records: Vec<StockRecord>,
    index: HashMap<String, usize>,
}

impl StockTable {
    /// Normalize fabric keys and index them. Duplicate fabric types are a
    /// dataset error.
    pub fn new(mut records: Vec<StockRecord>) -> EngineResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter_mut().enumerate() {
            record.fabric_type = normalize_key(&record.fabric_type);
            if index.insert(record.fabric_type.clone(), i).is_some() {
                return Err(EngineError::Dataset {
                    table: "stock",
                    line: i + 2,
                    reason: format!("duplicate fabric type '{}'", record.fabric_type),
                });
            }
        }
        Ok(Self { records, index })
    }

    /// Look up a fabric by name (case-insensitive, trimmed).
    pub fn get(&self, fabric: &str) -> Option<&StockRecord> {
        self.index
            .get(&normalize_key(fabric))
            .map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Demand rows in file order.
#[derive(Clone, Debug)]
pub struct DemandTable {
    records: Vec<DemandRecord>,
}

impl DemandTable {
    /// Normalize fabric keys. A fabric named like the no-recommendation
    /// sentinel is rejected so the sentinel can never be mistaken for data.
    pub fn new(mut records: Vec<DemandRecord>) -> EngineResult<Self> {
        let sentinel = normalize_key(NO_RECOMMENDATIONS);
        for (i, record) in records.iter_mut().enumerate() {
            record.fabric_type = normalize_key(&record.fabric_type);
            if record.fabric_type == sentinel {
                return Err(EngineError::Dataset {
                    table: "demand",
                    line: i + 2,
                    reason: "fabric type collides with the no-recommendation sentinel".into(),
                });
            }
        }
        Ok(Self { records })
    }

    /// All rows for a fabric, in file order.
    pub fn rows_for(&self, fabric: &str) -> Vec<&DemandRecord> {
        let key = normalize_key(fabric);
        self.records
            .iter()
            .filter(|r| r.fabric_type == key)
            .collect()
    }

    pub fn records(&self) -> &[DemandRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fabric waste rows in file order.
#[derive(Clone, Debug)]
pub struct FabricWasteTable {
    records: Vec<FabricWasteRecord>,
}

impl FabricWasteTable {
    pub fn new(mut records: Vec<FabricWasteRecord>) -> Self {
        for record in records.iter_mut() {
            record.fabric = normalize_key(&record.fabric);
        }
        Self { records }
    }

    /// First row for a fabric (case-insensitive, trimmed).
    pub fn find(&self, fabric: &str) -> Option<&FabricWasteRecord> {
        let key = normalize_key(fabric);
        self.records.iter().find(|r| r.fabric == key)
    }

    pub fn records(&self) -> &[FabricWasteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The three tables, loaded once and shared read-only.
#[derive(Clone, Debug)]
pub struct Datasets {
    pub stock: Arc<StockTable>,
    pub demand: Arc<DemandTable>,
    pub waste: Arc<FabricWasteTable>,
}

impl Datasets {
    pub fn new(stock: StockTable, demand: DemandTable, waste: FabricWasteTable) -> Self {
        Self {
            stock: Arc::new(stock),
            demand: Arc::new(demand),
            waste: Arc::new(waste),
        }
    }

    /// Load all three tables from CSV files.
    pub fn load_files(
        stock: impl AsRef<Path>,
        demand: impl AsRef<Path>,
        waste: impl AsRef<Path>,
    ) -> EngineResult<Self> {
        let datasets = Self::new(
            StockTable::new(load_stock(open(stock.as_ref())?)?)?,
            DemandTable::new(load_demand(open(demand.as_ref())?)?)?,
            FabricWasteTable::new(load_fabric_waste(open(waste.as_ref())?)?),
        );
        log::info!(
            "loaded datasets stock={} demand={} waste={}",
            datasets.stock.len(),
            datasets.demand.len(),
            datasets.waste.len()
        );
        Ok(datasets)
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Load stock rows from a CSV reader.
pub fn load_stock<R: Read>(reader: R) -> EngineResult<Vec<StockRecord>> {
    load_rows(reader, "stock", STOCK_COLUMNS)
}

/// Load demand rows from a CSV reader.
pub fn load_demand<R: Read>(reader: R) -> EngineResult<Vec<DemandRecord>> {
    load_rows(reader, "demand", DEMAND_COLUMNS)
}

/// Load fabric waste rows from a CSV reader.
pub fn load_fabric_waste<R: Read>(reader: R) -> EngineResult<Vec<FabricWasteRecord>> {
    load_rows(reader, "waste", WASTE_COLUMNS)
}

fn open(path: &Path) -> EngineResult<std::fs::File> {
    std::fs::File::open(path).map_err(|source| EngineError::Open {
        path: path.display().to_string(),
        source,
    })
}

fn load_rows<T, R>(reader: R, table: &'static str, required: &[&str]) -> EngineResult<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| EngineError::Dataset {
        table,
        line: 1,
        reason: e.to_string(),
    })?;
    if let Some(missing) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(EngineError::Dataset {
            table,
            line: 1,
            reason: format!("missing column '{}'", missing),
        });
    }

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: T = result.map_err(|e| EngineError::Dataset {
            table,
            line: line_num + 2,
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}
