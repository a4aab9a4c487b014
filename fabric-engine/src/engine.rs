//! The assembled engine: loaded tables, the trained disposal model and
//! the four query operations, shared read-only after startup.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::dataset::Datasets;
use crate::disposal_model::{DisposalModel, DisposalPredictor};
use crate::error::EngineResult;
use crate::inventory::{inventory_summary, stock_details};
use crate::price_estimator::PriceEstimator;
use crate::recommendation::RecommendationFilter;
use crate::recycling::RecyclingEngine;
use crate::types::{InventorySummary, PricePrediction, RecyclingGuide, StockDetails};

pub struct FabricEngine {
    config: EngineConfig,
    datasets: Datasets,
    model: Arc<DisposalModel>,
    prices: PriceEstimator,
    recommender: RecommendationFilter,
    recycling: RecyclingEngine,
}

impl FabricEngine {
    /// Validate the config and train the disposal model on the waste table.
    pub fn startup(datasets: Datasets, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let model = DisposalModel::train(&datasets.waste, &config.forest, config.holdout_fraction)?;
        Ok(Self::with_model(datasets, config, model))
    }

    /// Assemble around an already trained (or loaded) model.
    pub fn with_model(datasets: Datasets, config: EngineConfig, model: DisposalModel) -> Self {
        let model = Arc::new(model);
        let predictor: Arc<dyn DisposalPredictor> = model.clone();
        let prices = PriceEstimator::new(Arc::clone(&datasets.demand), config.demand_policy.clone());
        let recommender = RecommendationFilter::new(Arc::clone(&datasets.demand));
        let recycling = RecyclingEngine::new(Arc::clone(&datasets.waste), predictor);

        log::info!(
            "engine ready fabrics={} demand_rows={} waste_rows={} policy={:?}",
            datasets.stock.len(),
            datasets.demand.len(),
            datasets.waste.len(),
            config.demand_policy
        );

        Self {
            config,
            datasets,
            model,
            prices,
            recommender,
            recycling,
        }
    }

    pub fn stock(&self, fabric: &str) -> EngineResult<StockDetails> {
        stock_details(&self.datasets.stock, fabric)
    }

    pub fn predict_price(&self, fabric: &str) -> EngineResult<PricePrediction> {
        self.prices.predict(fabric)
    }

    pub fn estimate_price(
        &self,
        fabric: &str,
        historical_demand: f64,
        current_demand: f64,
    ) -> EngineResult<PricePrediction> {
        self.prices.estimate(fabric, historical_demand, current_demand)
    }

    pub fn recommend(&self, season: &str, occasion: &str, budget: &str) -> Vec<String> {
        self.recommender.recommend(season, occasion, budget)
    }

    pub fn recycling_guide(&self, fabric: &str) -> EngineResult<RecyclingGuide> {
        self.recycling.guide(fabric)
    }

    pub fn inventory_summary(&self) -> InventorySummary {
        inventory_summary(
            &self.datasets.stock,
            &self.datasets.demand,
            self.config.low_stock_threshold,
        )
    }

    pub fn model(&self) -> &DisposalModel {
        &self.model
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }
}
