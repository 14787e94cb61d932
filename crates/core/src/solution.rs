use crate::math::Scalar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Optimal,
    OptimalInaccurate,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterations,
    MaxTime,
    NumericalFailure,
    SetupFailure,
}

impl Status {
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Optimal => "optimal",
            Status::OptimalInaccurate => "optimal_inaccurate",
            Status::PrimalInfeasible => "infeasible",
            Status::DualInfeasible => "unbounded",
            Status::MaxIterations => "max_iterations",
            Status::MaxTime => "max_time",
            Status::NumericalFailure => "numerical_failure",
            Status::SetupFailure => "setup_failure",
        };
        f.write_str(label)
    }
}

/// Optimal point returned by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub primal: Vec<Scalar>,
    pub objective_value: Scalar,
    pub iterations: u32,
    pub solve_time: Duration,
}

/// Any solve that did not end in [`Status::Optimal`].
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[error("solve failed with status {status}: {detail}")]
pub struct SolveFailure {
    pub status: Status,
    pub detail: String,
}

impl SolveFailure {
    pub fn new(status: Status, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}
