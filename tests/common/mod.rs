//! Shared helpers for integration tests.
//!
//! Set `RUST_LOG` (e.g. `critbit=trace`) and build with `--features tracing`
//! to see arena and splice events in test output.

#![allow(dead_code)]

use std::sync::Once;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic generator so failures reproduce.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

/// `n` random keys of `len` lowercase hex characters.
pub fn hex_keys(rng: &mut StdRng, n: usize, len: usize) -> Vec<Vec<u8>> {
    const HEX: &[u8] = b"0123456789abcdef";
    (0..n)
        .map(|_| (0..len).map(|_| HEX[rng.gen_range(0..HEX.len())]).collect())
        .collect()
}

/// `n` random keys of 0..=`max_len` arbitrary bytes.
pub fn byte_keys(rng: &mut StdRng, n: usize, max_len: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|_| {
            let len = rng.gen_range(0..=max_len);
            (0..len).map(|_| rng.gen::<u8>()).collect()
        })
        .collect()
}
