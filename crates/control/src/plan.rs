use heatmpc_core::{Assignment, Scalar, SolveFailure, Status};
use serde::{Deserialize, Serialize};

use crate::formulation::HorizonLayout;

/// Solver output for one step, split back into actions and predicted states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPlan {
    pub actions: Vec<Scalar>,
    pub states: Vec<Scalar>,
    pub objective: Scalar,
}

impl HorizonPlan {
    pub fn from_assignment(
        layout: HorizonLayout,
        assignment: &Assignment,
    ) -> Result<Self, SolveFailure> {
        if assignment.primal.len() != layout.nvars() {
            return Err(SolveFailure::new(
                Status::NumericalFailure,
                format!(
                    "solver returned {} values for {} decision variables",
                    assignment.primal.len(),
                    layout.nvars()
                ),
            ));
        }
        let horizon = layout.horizon();
        let actions = (0..horizon)
            .map(|t| assignment.primal[layout.action(t)])
            .collect();
        let states = (0..=horizon)
            .map(|t| assignment.primal[layout.state(t)])
            .collect();
        Ok(Self {
            actions,
            states,
            objective: assignment.objective_value,
        })
    }

    /// The only part of the plan that is ever applied.
    pub fn first_action(&self) -> Scalar {
        self.actions[0]
    }

    pub fn predicted_next(&self) -> Scalar {
        self.states[1]
    }
}
