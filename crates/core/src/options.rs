use crate::math::Scalar;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings forwarded to the QP backend on every solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Feasibility and duality-gap tolerance.
    pub tolerance: Scalar,
    pub max_iterations: u32,
    pub max_time: Option<Duration>,
    pub equilibrate: bool,
    pub verbose: bool,
}

impl SolveOptions {
    pub fn with_tolerance(tolerance: Scalar) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 200,
            max_time: None,
            equilibrate: true,
            verbose: false,
        }
    }
}
