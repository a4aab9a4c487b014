//! Seeded bagged decision-tree classifier.
//!
//! Each member is a `linfa-trees` Gini tree grown on its own bootstrap
//! sample, and predictions are the trees' majority vote. Every tree owns
//! an RNG seeded from the forest seed and its index, so training is
//! reproducible and independent of the order Rayon schedules the trees
//! in. Vote ties go to the lowest class code.

use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};
use crate::math::{argmax, member_seed};

/// Default ensemble size.
pub const DEFAULT_N_ESTIMATORS: usize = 100;
/// Default seed for reproducible training.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub bootstrap: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            seed: DEFAULT_SEED,
            max_depth: None,
            min_samples_split: 2,
            bootstrap: true,
        }
    }
}

impl ForestParams {
    fn validate(&self) -> MlResult<()> {
        if self.n_estimators == 0 {
            return Err(MlError::InvalidParameter {
                name: "n_estimators",
                reason: "must be > 0".into(),
            });
        }
        if self.min_samples_split < 2 {
            return Err(MlError::InvalidParameter {
                name: "min_samples_split",
                reason: format!("must be >= 2, got {}", self.min_samples_split),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree<f64, usize>>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    /// Create an untrained forest.
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_classes: 0,
            n_features: 0,
        }
    }

    /// Train on feature matrix `x` (one row per sample) and class codes `y`.
    ///
    /// Replaces any previously trained trees.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) -> MlResult<()> {
        self.params.validate()?;
        if x.nrows() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(MlError::ShapeMismatch {
                what: "labels",
                expected: x.nrows(),
                actual: y.len(),
            });
        }

        let n_rows = x.nrows();
        let n_features = x.ncols();
        let n_classes = y.iter().copied().max().map_or(0, |m| m + 1);
        let targets = Array1::from(y.to_vec());
        let params = &self.params;

        let trees = (0..params.n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(member_seed(params.seed, i));
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
                } else {
                    (0..n_rows).collect()
                };
                let dataset = DatasetBase::new(
                    x.select(Axis(0), &samples),
                    targets.select(Axis(0), &samples),
                );
                DecisionTree::params()
                    .split_quality(SplitQuality::Gini)
                    .max_depth(params.max_depth)
                    .min_weight_split(params.min_samples_split as f32)
                    .fit(&dataset)
                    .map_err(|e| MlError::Fit(e.to_string()))
            })
            .collect::<MlResult<Vec<_>>>()?;

        log::debug!(
            "trained forest trees={} rows={} features={} classes={}",
            trees.len(),
            n_rows,
            n_features,
            n_classes
        );

        self.trees = trees;
        self.n_classes = n_classes;
        self.n_features = n_features;
        Ok(())
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Share of tree votes per class code, for each row of `x`.
    pub fn vote_shares(&self, x: &Array2<f64>) -> MlResult<Array2<f64>> {
        if !self.is_trained() {
            return Err(MlError::ModelNotTrained);
        }
        if x.ncols() != self.n_features {
            return Err(MlError::ShapeMismatch {
                what: "features",
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let mut votes = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for tree in &self.trees {
            let labels: Array1<usize> = tree.predict(x);
            for (row, &label) in labels.iter().enumerate() {
                votes[[row, label]] += 1.0;
            }
        }
        votes /= self.trees.len() as f64;
        Ok(votes)
    }

    /// Vote shares for one feature row.
    pub fn predict_proba(&self, row: &[f64]) -> MlResult<Vec<f64>> {
        let x = Array2::from_shape_vec((1, row.len()), row.to_vec()).map_err(|_| {
            MlError::ShapeMismatch {
                what: "features",
                expected: self.n_features,
                actual: row.len(),
            }
        })?;
        Ok(self.vote_shares(&x)?.row(0).to_vec())
    }

    /// Most voted class code for one feature row.
    pub fn predict(&self, row: &[f64]) -> MlResult<usize> {
        let proba = self.predict_proba(row)?;
        argmax(&proba).ok_or(MlError::ModelNotTrained)
    }

    /// Predict every row of `x`.
    pub fn predict_batch(&self, x: &Array2<f64>) -> MlResult<Vec<usize>> {
        let shares = self.vote_shares(x)?;
        shares
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()).ok_or(MlError::ModelNotTrained))
            .collect()
    }

    /// Fraction of rows whose prediction matches `y`.
    pub fn accuracy(&self, x: &Array2<f64>, y: &[usize]) -> MlResult<f64> {
        if x.nrows() != y.len() {
            return Err(MlError::ShapeMismatch {
                what: "labels",
                expected: x.nrows(),
                actual: y.len(),
            });
        }
        if y.is_empty() {
            return Err(MlError::EmptyTrainingSet);
        }
        let predictions = self.predict_batch(x)?;
        let correct = predictions.iter().zip(y).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn clustered() -> (Array2<f64>, Vec<usize>) {
        let x = array![
            [1.0, 1.0, 10.0, 0.5],
            [1.0, 1.0, 12.0, 0.6],
            [1.0, 1.0, 11.0, 0.4],
            [1.0, 0.0, 40.0, 2.0],
            [1.0, 0.0, 42.0, 2.1],
            [1.0, 0.0, 41.0, 1.9],
            [0.0, 1.0, 80.0, 5.0],
            [0.0, 1.0, 82.0, 5.2],
            [0.0, 1.0, 81.0, 4.8],
        ];
        (x, vec![0, 0, 0, 1, 1, 1, 2, 2, 2])
    }

    #[test]
    fn predict_before_fit_fails() {
        let forest = RandomForest::new(ForestParams::default());
        assert!(matches!(
            forest.predict(&[0.0, 0.0, 0.0, 0.0]),
            Err(MlError::ModelNotTrained)
        ));
    }

    #[test]
    fn fit_recovers_clusters() {
        let (x, y) = clustered();
        let mut forest = RandomForest::new(ForestParams::default());
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 100);
        assert_eq!(forest.predict_batch(&x).unwrap(), y);
        assert_eq!(forest.accuracy(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = clustered();
        let mut forest = RandomForest::new(ForestParams::default());
        forest.fit(&x, &y).unwrap();
        let proba = forest.predict_proba(&[1.0, 0.0, 30.0, 1.0]).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let (x, y) = clustered();
        let mut forest = RandomForest::new(ForestParams::default());
        forest.fit(&x, &y).unwrap();
        assert!(matches!(
            forest.predict(&[1.0, 0.0]),
            Err(MlError::ShapeMismatch { expected: 4, actual: 2, .. })
        ));
    }

    #[test]
    fn mismatched_labels_are_rejected() {
        let (x, _) = clustered();
        let mut forest = RandomForest::new(ForestParams::default());
        assert!(forest.fit(&x, &[0, 1]).is_err());
        assert!(!forest.is_trained());
    }

    #[test]
    fn zero_estimators_is_invalid() {
        let (x, y) = clustered();
        let mut forest = RandomForest::new(ForestParams {
            n_estimators: 0,
            ..ForestParams::default()
        });
        assert!(matches!(
            forest.fit(&x, &y),
            Err(MlError::InvalidParameter { name: "n_estimators", .. })
        ));
    }
}
