use heatmpc_core::{ConfigError, HeatingConfig, QpSolver, Scalar, SolveFailure, Status};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::formulation::{build_horizon_problem, HorizonLayout};
use crate::plan::HorizonPlan;
use crate::simulation::{run_validated, Trajectory};

/// Heater power applied when a step's solve is not optimal.
pub const FALLBACK_ACTION: Scalar = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Optimal,
    Fallback,
}

/// What happened during one closed-loop step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub temperature: Scalar,
    pub action: Scalar,
    pub next_temperature: Scalar,
    pub source: ActionSource,
    pub status: Status,
    /// Next temperature according to the plan; absent on fallback steps.
    pub predicted_next: Option<Scalar>,
    pub objective: Option<Scalar>,
}

/// Builds and solves the horizon problem for `current_temp`.
pub fn plan<S: QpSolver + ?Sized>(
    config: &HeatingConfig,
    solver: &mut S,
    current_temp: Scalar,
) -> Result<HorizonPlan, SolveFailure> {
    let problem = build_horizon_problem(config, current_temp)
        .map_err(|err| SolveFailure::new(Status::SetupFailure, err.to_string()))?;
    let assignment = solver.solve(&problem)?;
    HorizonPlan::from_assignment(HorizonLayout::new(config.horizon), &assignment)
}

/// Plans, picks the action to apply and advances the room model by one step.
///
/// Never fails: a [`SolveFailure`] is logged and replaced by [`FALLBACK_ACTION`].
pub fn step<S: QpSolver + ?Sized>(
    config: &HeatingConfig,
    solver: &mut S,
    step_index: usize,
    current_temp: Scalar,
) -> StepRecord {
    let (action, source, status, predicted_next, objective) =
        match plan(config, solver, current_temp) {
            Ok(plan) => (
                plan.first_action(),
                ActionSource::Optimal,
                Status::Optimal,
                Some(plan.predicted_next()),
                Some(plan.objective),
            ),
            Err(failure) => {
                warn!(
                    step = step_index,
                    status = %failure.status,
                    detail = %failure.detail,
                    "optimisation problem not solved; applying zero heater power"
                );
                (
                    FALLBACK_ACTION,
                    ActionSource::Fallback,
                    failure.status,
                    None,
                    None,
                )
            }
        };

    let next_temperature = config.model().next_temperature(current_temp, action);
    debug!(
        step = step_index,
        temperature = current_temp,
        action,
        next_temperature,
        "step applied"
    );
    StepRecord {
        step: step_index,
        temperature: current_temp,
        action,
        next_temperature,
        source,
        status,
        predicted_next,
        objective,
    }
}

/// Owns a validated configuration together with its QP backend.
pub struct RecedingHorizonController<S> {
    config: HeatingConfig,
    solver: S,
}

impl<S: QpSolver> RecedingHorizonController<S> {
    pub fn new(config: HeatingConfig, solver: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &HeatingConfig {
        &self.config
    }

    pub fn into_solver(self) -> S {
        self.solver
    }

    pub fn plan(&mut self, current_temp: Scalar) -> Result<HorizonPlan, SolveFailure> {
        plan(&self.config, &mut self.solver, current_temp)
    }

    pub fn step(&mut self, step_index: usize, current_temp: Scalar) -> StepRecord {
        step(&self.config, &mut self.solver, step_index, current_temp)
    }

    pub fn run(&mut self) -> Trajectory {
        run_validated(&self.config, &mut self.solver)
    }
}
