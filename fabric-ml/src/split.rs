use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{MlError, MlResult};

/// Below this many rows no holdout is carved out; every row trains.
pub const MIN_ROWS_FOR_HOLDOUT: usize = 5;

/// Row indices partitioned into a training set and a holdout set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded RNG and reserve
/// `ceil(n_rows * test_fraction)` rows for the holdout. At least one
/// row always stays in training.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> MlResult<TrainTestSplit> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(MlError::InvalidParameter {
            name: "test_fraction",
            reason: format!("must be in [0, 1), got {}", test_fraction),
        });
    }
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = if n_rows < MIN_ROWS_FOR_HOLDOUT {
        0
    } else {
        (((n_rows as f64) * test_fraction).ceil() as usize).min(n_rows - 1)
    };
    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}
