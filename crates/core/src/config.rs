use crate::dynamics::ThermalModel;
use crate::math::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: Scalar },
    #[error("{field} must be non-negative (got {value})")]
    Negative { field: &'static str, value: Scalar },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: Scalar },
    #[error("horizon must contain at least one step")]
    EmptyHorizon,
    #[error("comfort band is empty: min_temp {min} exceeds max_temp {max}")]
    EmptyComfortBand { min: Scalar, max: Scalar },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fixed parameters of one heating run.
///
/// Every field is read-only for the duration of a run; the controller and the
/// simulation loop receive it by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatingConfig {
    /// Number of future steps in each optimisation.
    pub horizon: usize,
    /// Number of simulated steps. Falls back to `horizon` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<usize>,
    /// Duration of one step in hours, used for reporting only.
    #[serde(default = "default_step_hours")]
    pub step_hours: Scalar,
    pub desired_temp: Scalar,
    pub min_temp: Scalar,
    pub max_temp: Scalar,
    /// Heater power limit; actions live in `[0, max_action]`.
    pub max_action: Scalar,
    /// Cost per unit of squared heater power.
    pub action_weight: Scalar,
    /// Cost per unit of squared deviation from `desired_temp`.
    pub deviation_weight: Scalar,
    /// Temperature gain per unit of heater power.
    pub heating_coeff: Scalar,
    /// Fraction of the indoor/ambient gap lost per step.
    pub cooling_coeff: Scalar,
    pub ambient_temp: Scalar,
    pub initial_temp: Scalar,
}

fn default_step_hours() -> Scalar {
    1.0
}

impl Default for HeatingConfig {
    fn default() -> Self {
        Self {
            horizon: 48,
            steps: None,
            step_hours: default_step_hours(),
            desired_temp: 20.0,
            min_temp: 16.0,
            max_temp: 24.0,
            max_action: 1.5,
            action_weight: 1.0,
            deviation_weight: 2.0,
            heating_coeff: 0.5,
            cooling_coeff: 0.07,
            ambient_temp: 5.0,
            initial_temp: 16.0,
        }
    }
}

impl HeatingConfig {
    pub fn total_steps(&self) -> usize {
        self.steps.unwrap_or(self.horizon)
    }

    pub fn model(&self) -> ThermalModel {
        ThermalModel {
            heating_coeff: self.heating_coeff,
            cooling_coeff: self.cooling_coeff,
            ambient_temp: self.ambient_temp,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let scalars = [
            ("step_hours", self.step_hours),
            ("desired_temp", self.desired_temp),
            ("min_temp", self.min_temp),
            ("max_temp", self.max_temp),
            ("max_action", self.max_action),
            ("action_weight", self.action_weight),
            ("deviation_weight", self.deviation_weight),
            ("heating_coeff", self.heating_coeff),
            ("cooling_coeff", self.cooling_coeff),
            ("ambient_temp", self.ambient_temp),
            ("initial_temp", self.initial_temp),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }
        if self.horizon == 0 {
            return Err(ConfigError::EmptyHorizon);
        }
        if self.min_temp > self.max_temp {
            return Err(ConfigError::EmptyComfortBand {
                min: self.min_temp,
                max: self.max_temp,
            });
        }
        if self.step_hours <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "step_hours",
                value: self.step_hours,
            });
        }
        let non_negative = [
            ("max_action", self.max_action),
            ("action_weight", self.action_weight),
            ("deviation_weight", self.deviation_weight),
            ("heating_coeff", self.heating_coeff),
            ("cooling_coeff", self.cooling_coeff),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}
