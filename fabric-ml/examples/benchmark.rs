//! Training benchmark for the fabric-ml random forest.
//!
//! Generates synthetic fabric waste rows and measures forest training and
//! batch prediction time at the production ensemble size.
//!
//! Run with:
//!   cargo run --example benchmark --release -p fabric-ml

use fabric_ml::{train_test_split, ForestParams, RandomForest};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

const NUM_ROWS: usize = 20_000;
const SEED: u64 = 42;

fn main() {
    println!("=== fabric-ml Forest Benchmark ===");
    println!();

    // -----------------------------------------------------------------------
    // 1. Generate synthetic data
    // -----------------------------------------------------------------------
    println!("Generating {} synthetic waste rows...", NUM_ROWS);
    let gen_start = Instant::now();
    let (x, y) = generate_synthetic_rows(NUM_ROWS, SEED);
    println!("  Data generation: {:.3}s", gen_start.elapsed().as_secs_f64());
    println!();

    // -----------------------------------------------------------------------
    // 2. Split and train
    // -----------------------------------------------------------------------
    let split = train_test_split(NUM_ROWS, 0.2, SEED).expect("valid split");
    let x_train = x.select(ndarray::Axis(0), &split.train);
    let y_train: Vec<usize> = split.train.iter().map(|&i| y[i]).collect();
    let x_test = x.select(ndarray::Axis(0), &split.test);
    let y_test: Vec<usize> = split.test.iter().map(|&i| y[i]).collect();

    println!("Training 100 trees on {} rows...", x_train.nrows());
    let train_start = Instant::now();
    let mut forest = RandomForest::new(ForestParams::default());
    forest.fit(&x_train, &y_train).expect("training succeeds");
    let train_elapsed = train_start.elapsed();
    println!("  Training: {:.3}s", train_elapsed.as_secs_f64());

    // -----------------------------------------------------------------------
    // 3. Predict
    // -----------------------------------------------------------------------
    let predict_start = Instant::now();
    let accuracy = forest.accuracy(&x_test, &y_test).expect("prediction succeeds");
    let predict_elapsed = predict_start.elapsed();
    println!(
        "  Holdout prediction: {:.3}s ({:.0} rows/s), accuracy {:.1}%",
        predict_elapsed.as_secs_f64(),
        x_test.nrows() as f64 / predict_elapsed.as_secs_f64(),
        accuracy * 100.0
    );
    println!();
}

/// Four disposal classes separated mostly by waste volume, with label noise.
fn generate_synthetic_rows(n: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(n * 4);
    let mut labels = Vec::with_capacity(n);
    for _ in 0..n {
        let class = rng.gen_range(0..4usize);
        let biodegradable = if class < 2 { 1.0 } else { 0.0 };
        let recyclable = if class % 2 == 0 { 1.0 } else { 0.0 };
        let waste = 100.0 + class as f64 * 200.0 + rng.gen_range(-120.0..120.0);
        let trend = rng.gen_range(-5.0..10.0);
        data.extend_from_slice(&[biodegradable, recyclable, waste, trend]);
        labels.push(if rng.gen_bool(0.05) {
            rng.gen_range(0..4)
        } else {
            class
        });
    }
    let x = Array2::from_shape_vec((n, 4), data).expect("shape matches");
    (x, labels)
}
