//! Ordinary least squares with an intercept.
//!
//! Demand columns that are constant or a linear combination of earlier
//! columns are dropped before the fit and get a zero coefficient, so a
//! fabric with a single demand row or with proportional demand columns
//! still fits. The remaining columns are solved by `linfa-linear`.

use linfa::traits::Fit;
use linfa::DatasetBase;
use linfa_linear::LinearRegression as OrdinaryLeastSquares;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{MlError, MlResult};

/// Relative residual norm below which a centered column counts as
/// dependent on the columns already kept.
const DEPENDENCE_TOL: f64 = 1e-8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Fit `y ≈ x · w + b`.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> MlResult<Self> {
        if x.nrows() == 0 {
            return Err(MlError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(MlError::ShapeMismatch {
                what: "targets",
                expected: x.nrows(),
                actual: y.len(),
            });
        }

        let kept = independent_columns(x)?;
        let mut coefficients = vec![0.0; x.ncols()];
        if kept.is_empty() {
            let intercept = y.mean().ok_or(MlError::EmptyTrainingSet)?;
            return Ok(Self {
                coefficients,
                intercept,
            });
        }

        let dataset = DatasetBase::new(x.select(Axis(1), &kept), y.to_owned());
        let fitted = OrdinaryLeastSquares::new()
            .fit(&dataset)
            .map_err(|e| MlError::Fit(e.to_string()))?;
        for (&column, &weight) in kept.iter().zip(fitted.params().iter()) {
            coefficients[column] = weight;
        }
        Ok(Self {
            coefficients,
            intercept: fitted.intercept(),
        })
    }

    pub fn predict(&self, row: &[f64]) -> MlResult<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MlError::ShapeMismatch {
                what: "features",
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, v)| w * v)
                .sum::<f64>())
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Indices of the centered columns that are linearly independent, in
/// order, found by Gram-Schmidt.
fn independent_columns(x: &Array2<f64>) -> MlResult<Vec<usize>> {
    let mean = x.mean_axis(Axis(0)).ok_or(MlError::EmptyTrainingSet)?;
    let centered = x - &mean;
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut kept = Vec::new();
    for (j, column) in centered.columns().into_iter().enumerate() {
        let norm = column.dot(&column).sqrt();
        if norm == 0.0 {
            continue;
        }
        let mut residual = column.to_owned();
        for unit in &basis {
            let projection = residual.dot(unit);
            residual.scaled_add(-projection, unit);
        }
        let residual_norm = residual.dot(&residual).sqrt();
        if residual_norm > DEPENDENCE_TOL * norm {
            basis.push(residual / residual_norm);
            kept.push(j);
        }
    }
    Ok(kept)
}
