//! Textile inventory engine.
//!
//! Loads the stock, demand and fabric-waste tables once, trains the
//! disposal classifier, and answers stock, price, recommendation and
//! recycling queries against that read-only state. Sensor telemetry is
//! ingested on its own task and read through [`sensor::SensorHub`].

pub mod config;
pub mod dataset;
pub mod disposal_model;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod price_estimator;
pub mod recommendation;
pub mod recycling;
pub mod sensor;
pub mod thresholds;
pub mod types;
pub mod util;

pub use config::EngineConfig;
pub use dataset::{Datasets, DemandTable, FabricWasteTable, StockTable};
pub use disposal_model::{DisposalModel, DisposalPredictor, TrainingReport};
pub use engine::FabricEngine;
pub use error::{EngineError, EngineResult};
pub use price_estimator::{DemandPolicy, PriceEstimator};
pub use recommendation::RecommendationFilter;
pub use recycling::RecyclingEngine;
pub use sensor::{SensorError, SensorHub, SensorReading, TelemetryView};
pub use types::{
    DemandStatus, DisposalMethod, InventorySummary, PricePrediction, RecyclingGuide,
    RuleCoverage, StockDetails,
};
