//! Shared helpers for the integration tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Install a thread-local subscriber for the duration of a test.
pub fn init_test_subscriber() -> tracing::subscriber::DefaultGuard {
    let fmt_layer = fmt::layer().with_target(true).with_test_writer();

    let filter_layer = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .set_default()
}

/// One array of `len` uniform values in `[0, 100)`.
pub fn random_array(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(0.0..100.0)).collect()
}

/// `n` arrays of `len` uniform values, each with its own scale so the
/// distributions differ.
pub fn random_arrays(n: usize, len: usize, seed: u64) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let scale = 1.0 + i as f64 * 0.25;
            random_array(len, seed.wrapping_add(i as u64))
                .into_iter()
                .map(|v| v * scale)
                .collect()
        })
        .collect()
}

/// Like [`random_arrays`], rounded to whole numbers so most values are tied.
pub fn tied_arrays(n: usize, len: usize, seed: u64) -> Vec<Vec<f64>> {
    random_arrays(n, len, seed)
        .into_iter()
        .map(|a| a.into_iter().map(f64::round).collect())
        .collect()
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut copy = values.to_vec();
    copy.sort_by(|a, b| a.partial_cmp(b).unwrap());
    copy
}
