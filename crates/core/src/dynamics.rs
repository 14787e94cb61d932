//! First-order room model shared by the planner and the simulated plant.

use crate::math::Scalar;
use serde::{Deserialize, Serialize};

/// Linear single-zone thermal model.
///
/// `next = temp + heating_coeff * action - cooling_coeff * (temp - ambient_temp)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalModel {
    pub heating_coeff: Scalar,
    pub cooling_coeff: Scalar,
    pub ambient_temp: Scalar,
}

impl ThermalModel {
    pub fn next_temperature(&self, temp: Scalar, action: Scalar) -> Scalar {
        temp + self.heating_coeff * action - self.cooling_coeff * (temp - self.ambient_temp)
    }

    /// Temperature the room settles at under a constant `action`.
    ///
    /// Returns `None` when the room does not lose heat (`cooling_coeff == 0`).
    pub fn equilibrium(&self, action: Scalar) -> Option<Scalar> {
        if self.cooling_coeff == 0.0 {
            return None;
        }
        Some(self.ambient_temp + self.heating_coeff * action / self.cooling_coeff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn room() -> ThermalModel {
        ThermalModel {
            heating_coeff: 0.5,
            cooling_coeff: 0.07,
            ambient_temp: 5.0,
        }
    }

    #[test]
    fn zero_power_decays_toward_ambient() {
        let model = room();
        let next = model.next_temperature(16.0, 0.0);
        assert_relative_eq!(next, 16.0 - 0.07 * 11.0, epsilon = 1e-12);
        assert!(next > model.ambient_temp);
    }

    #[test]
    fn heating_adds_linear_gain() {
        let model = room();
        let idle = model.next_temperature(18.0, 0.0);
        let heated = model.next_temperature(18.0, 1.2);
        assert_relative_eq!(heated - idle, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn equilibrium_is_fixed_point() {
        let model = room();
        let settle = model.equilibrium(1.5).unwrap();
        assert_relative_eq!(model.next_temperature(settle, 1.5), settle, epsilon = 1e-9);
        assert!(settle < 16.0);

        let adiabatic = ThermalModel {
            cooling_coeff: 0.0,
            ..model
        };
        assert!(adiabatic.equilibrium(1.0).is_none());
    }
}
