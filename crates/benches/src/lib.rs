//! Shared inputs for the heatmpc benchmarks.

use heatmpc_core::{HeatingConfig, Scalar};
use rand::{rngs::SmallRng, Rng};

/// Horizon lengths exercised by the planning benchmarks.
pub const HORIZONS: [usize; 3] = [12, 24, 48];

/// Default room with enough heater power to keep every plan feasible.
pub fn bench_config(horizon: usize) -> HeatingConfig {
    HeatingConfig {
        horizon,
        max_action: 3.0,
        ..HeatingConfig::default()
    }
}

pub fn random_temperature(config: &HeatingConfig, rng: &mut SmallRng) -> Scalar {
    rng.gen_range(config.min_temp..=config.max_temp)
}
