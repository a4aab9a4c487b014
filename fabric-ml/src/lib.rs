//! Model primitives for the fabric advisor.
//!
//! Everything here is domain-free: categorical encoding, a seeded
//! bagged ensemble of `linfa-trees` classifiers, `linfa-linear`
//! least-squares regression and the reproducible train/holdout split
//! that feeds them.

pub mod encoder;
pub mod error;
pub mod forest;
pub mod math;
pub mod regression;
pub mod split;

pub use encoder::CategoryEncoder;
pub use error::{MlError, MlResult};
pub use forest::{ForestParams, RandomForest};
pub use regression::LinearRegression;
pub use split::{train_test_split, TrainTestSplit};
