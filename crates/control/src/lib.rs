//! Receding-horizon heating control.
//!
//! Every step builds a fresh quadratic program over the configured horizon,
//! solves it through a [`QpSolver`](heatmpc_core::QpSolver), applies only the
//! first planned action to the room model and discards the rest of the plan.
//! A step whose solve is not optimal applies zero heater power instead.

#![forbid(unsafe_code)]

pub mod controller;
pub mod formulation;
pub mod plan;
pub mod simulation;

pub use controller::{
    plan, step, ActionSource, RecedingHorizonController, StepRecord, FALLBACK_ACTION,
};
pub use formulation::{build_horizon_problem, HorizonLayout};
pub use plan::HorizonPlan;
pub use simulation::{simulate, Simulator, Trajectory, TrajectorySummary};
