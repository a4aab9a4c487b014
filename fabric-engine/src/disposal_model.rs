//! Disposal method classifier.
//!
//! The model artifact owns the three fitted encoders together with the
//! forest trained on their codes. There is no re-fit: predictions are
//! always decoded by the encoder that produced the training targets, and
//! a serialized copy carries its encoders with it.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use fabric_ml::{train_test_split, CategoryEncoder, ForestParams, RandomForest};

use crate::dataset::FabricWasteTable;
use crate::error::{EngineError, EngineResult};
use crate::types::{DisposalMethod, FabricWasteRecord};

/// Feature order fed to the forest.
pub const FEATURE_NAMES: [&str; 4] = [
    "Biodegradable",
    "Recyclable",
    "Monthly_Waste_kg",
    "Annual_Trend",
];

/// Anything that can name a disposal method for a waste record.
///
/// The recycling engine depends on this seam rather than on the forest so
/// its rule tree can be exercised with fixed predictions.
pub trait DisposalPredictor: Send + Sync {
    fn predict_method(&self, record: &FabricWasteRecord) -> EngineResult<DisposalMethod>;
}

/// Summary of the startup training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub holdout_rows: usize,
    /// `None` when the table was too small to hold rows out.
    pub holdout_accuracy: Option<f64>,
    pub classes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisposalModel {
    biodegradable: CategoryEncoder,
    recyclable: CategoryEncoder,
    disposal: CategoryEncoder,
    forest: RandomForest,
    report: TrainingReport,
}

impl DisposalModel {
    /// Fit the encoders on the full table, then train the forest on a
    /// seeded split and score it on the holdout.
    pub fn train(
        table: &FabricWasteTable,
        params: &ForestParams,
        holdout_fraction: f64,
    ) -> EngineResult<Self> {
        let records = table.records();
        let biodegradable = CategoryEncoder::fit(records.iter().map(|r| &r.biodegradable))?;
        let recyclable = CategoryEncoder::fit(records.iter().map(|r| &r.recyclable))?;
        let disposal = CategoryEncoder::fit(records.iter().map(|r| &r.disposal_method))?;

        let mut features = Vec::with_capacity(records.len() * FEATURE_NAMES.len());
        for record in records {
            features.extend_from_slice(&encode_features(&biodegradable, &recyclable, record)?);
        }
        let x = Array2::from_shape_vec((records.len(), FEATURE_NAMES.len()), features)
            .map_err(|e| EngineError::Dataset {
                table: "waste",
                line: 0,
                reason: e.to_string(),
            })?;
        let y = disposal.transform(records.iter().map(|r| &r.disposal_method))?;

        let split = train_test_split(records.len(), holdout_fraction, params.seed)?;
        let x_train = x.select(ndarray::Axis(0), &split.train);
        let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();

        let mut forest = RandomForest::new(params.clone());
        forest.fit(&x_train, &y_train)?;

        let holdout_accuracy = if split.test.is_empty() {
            None
        } else {
            let x_test = x.select(ndarray::Axis(0), &split.test);
            let y_test: Vec<usize> = split.test.iter().map(|&i| y[i]).collect();
            Some(forest.accuracy(&x_test, &y_test)?)
        };

        let report = TrainingReport {
            train_rows: split.train.len(),
            holdout_rows: split.test.len(),
            holdout_accuracy,
            classes: disposal.classes().to_vec(),
        };
        match report.holdout_accuracy {
            Some(acc) => log::info!(
                "trained disposal model train_rows={} holdout_rows={} holdout_accuracy={:.3} classes={}",
                report.train_rows,
                report.holdout_rows,
                acc,
                report.classes.len()
            ),
            None => log::info!(
                "trained disposal model train_rows={} holdout_rows=0 classes={}",
                report.train_rows,
                report.classes.len()
            ),
        }

        Ok(Self {
            biodegradable,
            recyclable,
            disposal,
            forest,
            report,
        })
    }

    /// Encoded feature row for a waste record.
    pub fn features(&self, record: &FabricWasteRecord) -> EngineResult<[f64; 4]> {
        encode_features(&self.biodegradable, &self.recyclable, record)
    }

    /// Predicted disposal label for a waste record.
    pub fn predict_label(&self, record: &FabricWasteRecord) -> EngineResult<&str> {
        let code = self.forest.predict(&self.features(record)?)?;
        Ok(self.disposal.decode(code)?)
    }

    pub fn disposal_encoder(&self) -> &CategoryEncoder {
        &self.disposal
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Write the model, encoders included, as JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> EngineResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        log::info!("saved disposal model path={}", path.as_ref().display());
        Ok(())
    }

    /// Read a model written by [`DisposalModel::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> EngineResult<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|source| EngineError::Open {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        let model: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        if !model.forest.is_trained() {
            return Err(fabric_ml::MlError::ModelNotTrained.into());
        }
        log::info!(
            "loaded disposal model path={} classes={}",
            path.as_ref().display(),
            model.disposal.len()
        );
        Ok(model)
    }
}

impl DisposalPredictor for DisposalModel {
    fn predict_method(&self, record: &FabricWasteRecord) -> EngineResult<DisposalMethod> {
        self.predict_label(record).map(DisposalMethod::from_label)
    }
}

fn encode_features(
    biodegradable: &CategoryEncoder,
    recyclable: &CategoryEncoder,
    record: &FabricWasteRecord,
) -> EngineResult<[f64; 4]> {
    Ok([
        biodegradable.encode(&record.biodegradable)? as f64,
        recyclable.encode(&record.recyclable)? as f64,
        record.monthly_waste_kg,
        record.annual_trend,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load_fabric_waste;
    use fabric_ml::MlError;

    /// Four well-separated disposal clusters, several rows each.
    fn waste_csv() -> String {
        let mut csv = String::from(
            "Fabric,Biodegradable,Recyclable,Monthly_Waste_kg,Annual_Trend,Disposal Method\n",
        );
        for i in 0..6 {
            let j = i as f64;
            csv.push_str(&format!("cotton{i},Yes,Yes,{},{},Composting\n", 100.0 + j, 2.0 + j * 0.1));
            csv.push_str(&format!("viscose{i},Yes,No,{},{},Chemical Recycling\n", 300.0 + j, 6.0 + j * 0.1));
            csv.push_str(&format!("polyester{i},No,Yes,{},{},Mechanical Recycling\n", 500.0 + j, 1.0 + j * 0.1));
            csv.push_str(&format!("acrylic{i},No,No,{},{},Incineration\n", 800.0 + j, 9.0 + j * 0.1));
        }
        csv
    }

    fn table() -> FabricWasteTable {
        FabricWasteTable::new(load_fabric_waste(waste_csv().as_bytes()).unwrap())
    }

    #[test]
    fn train_reports_split_and_classes() {
        let model = DisposalModel::train(&table(), &ForestParams::default(), 0.2).unwrap();
        let report = model.report();
        assert_eq!(report.holdout_rows, 5);
        assert_eq!(report.train_rows, 19);
        assert!(report.holdout_accuracy.is_some());
        assert_eq!(
            report.classes,
            vec!["Chemical Recycling", "Composting", "Incineration", "Mechanical Recycling"]
        );
    }

    #[test]
    fn predictions_decode_to_dataset_labels() {
        let table = table();
        let model = DisposalModel::train(&table, &ForestParams::default(), 0.0).unwrap();
        let cotton = table.find("cotton0").unwrap();
        assert_eq!(model.predict_method(cotton).unwrap(), DisposalMethod::Composting);
        let acrylic = table.find("acrylic3").unwrap();
        assert_eq!(model.predict_method(acrylic).unwrap(), DisposalMethod::Incineration);
    }

    #[test]
    fn features_use_fitted_codes() {
        let table = table();
        let model = DisposalModel::train(&table, &ForestParams::default(), 0.0).unwrap();
        let viscose = table.find("viscose0").unwrap();
        // Sorted codes: No=0, Yes=1.
        assert_eq!(model.features(viscose).unwrap(), [1.0, 0.0, 300.0, 6.0]);
    }

    #[test]
    fn same_seed_trains_identical_models() {
        let table = table();
        let a = DisposalModel::train(&table, &ForestParams::default(), 0.2).unwrap();
        let b = DisposalModel::train(&table, &ForestParams::default(), 0.2).unwrap();
        assert_eq!(a.report(), b.report());
        for record in table.records() {
            assert_eq!(a.predict_label(record).unwrap(), b.predict_label(record).unwrap());
        }
    }

    #[test]
    fn unseen_category_is_an_encoder_error() {
        let table = table();
        let model = DisposalModel::train(&table, &ForestParams::default(), 0.0).unwrap();
        let mut odd = table.records()[0].clone();
        odd.biodegradable = "Partially".into();
        let err = model.predict_method(&odd).unwrap_err();
        assert!(matches!(err, EngineError::Ml(MlError::UnknownLabel(_))));
    }

    #[test]
    fn near_total_holdout_still_trains() {
        let model = DisposalModel::train(&table(), &ForestParams::default(), 0.95).unwrap();
        assert_eq!(model.report().train_rows, 1);
        assert_eq!(model.report().holdout_rows, 23);
    }

    #[test]
    fn empty_table_cannot_train() {
        let empty = FabricWasteTable::new(Vec::new());
        assert!(DisposalModel::train(&empty, &ForestParams::default(), 0.2).is_err());
    }

    #[test]
    fn json_round_trip_keeps_encoders() {
        let table = table();
        let model = DisposalModel::train(&table, &ForestParams::default(), 0.2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fabric_recycling_model.json");
        model.save_json(&path).unwrap();
        let restored = DisposalModel::load_json(&path).unwrap();
        assert_eq!(restored.disposal_encoder(), model.disposal_encoder());
        for record in table.records() {
            assert_eq!(
                restored.predict_label(record).unwrap(),
                model.predict_label(record).unwrap()
            );
        }
    }

    #[test]
    fn loading_missing_model_fails() {
        let err = DisposalModel::load_json("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, EngineError::Open { .. }));
    }
}
