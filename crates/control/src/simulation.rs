use heatmpc_backend::ClarabelBackend;
use heatmpc_core::{ConfigError, HeatingConfig, QpSolver, Scalar, SolveOptions};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::controller::{step, ActionSource, StepRecord};

/// Slack allowed when counting comfort-band excursions.
const COMFORT_TOLERANCE: Scalar = 1e-6;

/// Realized closed-loop history of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// `steps + 1` temperatures, starting with the initial one.
    pub temperatures: Vec<Scalar>,
    /// `steps` applied heater settings.
    pub actions: Vec<Scalar>,
    pub records: Vec<StepRecord>,
}

impl Trajectory {
    pub fn new(initial_temp: Scalar) -> Self {
        Self {
            temperatures: vec![initial_temp],
            actions: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn current_temperature(&self) -> Scalar {
        self.temperatures[self.temperatures.len() - 1]
    }

    pub fn push(&mut self, record: StepRecord) {
        debug_assert_eq!(record.temperature, self.current_temperature());
        self.actions.push(record.action);
        self.temperatures.push(record.next_temperature);
        self.records.push(record);
    }

    /// Number of simulated steps.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn fallback_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|record| record.source == ActionSource::Fallback)
    }

    pub fn summary(&self, config: &HeatingConfig) -> TrajectorySummary {
        let temps = &self.temperatures;
        let min_temp = temps.iter().copied().fold(Scalar::INFINITY, Scalar::min);
        let max_temp = temps.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max);
        let mean_abs_deviation = temps
            .iter()
            .map(|temp| (temp - config.desired_temp).abs())
            .sum::<Scalar>()
            / temps.len() as Scalar;
        let comfort_violations = temps[1..]
            .iter()
            .filter(|&&temp| {
                temp < config.min_temp - COMFORT_TOLERANCE
                    || temp > config.max_temp + COMFORT_TOLERANCE
            })
            .count();
        TrajectorySummary {
            steps: self.len(),
            initial_temp: temps[0],
            final_temp: self.current_temperature(),
            min_temp,
            max_temp,
            mean_abs_deviation,
            total_action: self.actions.iter().sum(),
            fallback_steps: self.fallback_steps().count(),
            comfort_violations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub steps: usize,
    pub initial_temp: Scalar,
    pub final_temp: Scalar,
    pub min_temp: Scalar,
    pub max_temp: Scalar,
    pub mean_abs_deviation: Scalar,
    pub total_action: Scalar,
    pub fallback_steps: usize,
    /// Realized temperatures after step 0 outside the comfort band.
    pub comfort_violations: usize,
}

/// Runs the closed loop for `config.total_steps()` steps.
pub fn simulate<S: QpSolver + ?Sized>(
    config: &HeatingConfig,
    solver: &mut S,
) -> Result<Trajectory, ConfigError> {
    config.validate()?;
    Ok(run_validated(config, solver))
}

pub(crate) fn run_validated<S: QpSolver + ?Sized>(
    config: &HeatingConfig,
    solver: &mut S,
) -> Trajectory {
    let steps = config.total_steps();
    let _span = info_span!("simulate", horizon = config.horizon, steps).entered();
    info!(initial_temp = config.initial_temp, "starting closed-loop run");

    let mut trajectory = Trajectory::new(config.initial_temp);
    for k in 0..steps {
        let record = step(config, solver, k, trajectory.current_temperature());
        trajectory.push(record);
    }

    info!(
        final_temp = trajectory.current_temperature(),
        fallback_steps = trajectory.fallback_steps().count(),
        "closed-loop run finished"
    );
    trajectory
}

/// Builder wiring a configuration to a backend; Clarabel unless overridden.
pub struct Simulator {
    config: HeatingConfig,
    options: SolveOptions,
    backend: Option<Box<dyn QpSolver>>,
}

impl Simulator {
    pub fn new(config: HeatingConfig) -> Self {
        Self {
            config,
            options: SolveOptions::default(),
            backend: None,
        }
    }

    pub fn options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(mut self, backend: impl QpSolver + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    pub fn config(&self) -> &HeatingConfig {
        &self.config
    }

    pub fn run(self) -> Result<Trajectory, ConfigError> {
        let options = self.options;
        let mut backend: Box<dyn QpSolver> = match self.backend {
            Some(backend) => backend,
            None => Box::new(ClarabelBackend::new(options)),
        };
        simulate(&self.config, &mut backend)
    }
}
