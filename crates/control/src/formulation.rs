//! Per-step quadratic program.
//!
//! Decision vector `z = [u_0 .. u_{N-1}, x_0 .. x_N]` for horizon `N`:
//!
//! ```text
//! minimize   sum_{t<N} c u_t^2 + q (x_t - d)^2
//! subject to x_0     = current
//!            x_{t+1} = x_t + a u_t - b (x_t - w)
//!            0      <= u_t     <= max_action
//!            min    <= x_{t+1} <= max
//! ```

use heatmpc_core::{
    CscMatrix, HeatingConfig, LinearConstraints, ProblemResult, QuadraticProgram, Scalar,
};

/// Index map from horizon positions to entries of the decision vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonLayout {
    horizon: usize,
}

impl HorizonLayout {
    pub fn new(horizon: usize) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn action(&self, t: usize) -> usize {
        debug_assert!(t < self.horizon, "action index {t} beyond horizon");
        t
    }

    pub fn state(&self, t: usize) -> usize {
        debug_assert!(t <= self.horizon, "state index {t} beyond horizon");
        self.horizon + t
    }

    pub fn nvars(&self) -> usize {
        2 * self.horizon + 1
    }
}

pub fn build_horizon_problem(
    config: &HeatingConfig,
    current_temp: Scalar,
) -> ProblemResult<QuadraticProgram> {
    let layout = HorizonLayout::new(config.horizon);
    let n = layout.nvars();
    let horizon = layout.horizon();

    let mut p_entries = Vec::with_capacity(2 * horizon);
    let mut linear = vec![0.0; n];
    for t in 0..horizon {
        p_entries.push((layout.action(t), layout.action(t), 2.0 * config.action_weight));
        p_entries.push((layout.state(t), layout.state(t), 2.0 * config.deviation_weight));
        linear[layout.state(t)] = -2.0 * config.deviation_weight * config.desired_temp;
    }
    let constant =
        horizon as Scalar * config.deviation_weight * config.desired_temp * config.desired_temp;

    let retain = 1.0 - config.cooling_coeff;
    let mut eq_entries = Vec::with_capacity(1 + 3 * horizon);
    let mut eq_rhs = Vec::with_capacity(1 + horizon);
    eq_entries.push((0, layout.state(0), 1.0));
    eq_rhs.push(current_temp);
    for t in 0..horizon {
        let row = t + 1;
        eq_entries.push((row, layout.state(t + 1), 1.0));
        eq_entries.push((row, layout.state(t), -retain));
        eq_entries.push((row, layout.action(t), -config.heating_coeff));
        eq_rhs.push(config.cooling_coeff * config.ambient_temp);
    }

    let mut ineq_entries = Vec::with_capacity(4 * horizon);
    let mut ineq_rhs = Vec::with_capacity(4 * horizon);
    for t in 0..horizon {
        let row = 4 * t;
        ineq_entries.push((row, layout.action(t), 1.0));
        ineq_entries.push((row + 1, layout.action(t), -1.0));
        ineq_entries.push((row + 2, layout.state(t + 1), 1.0));
        ineq_entries.push((row + 3, layout.state(t + 1), -1.0));
        ineq_rhs.extend_from_slice(&[config.max_action, 0.0, config.max_temp, -config.min_temp]);
    }

    Ok(QuadraticProgram {
        quadratic: CscMatrix::from_triplets(n, n, &p_entries)?,
        linear,
        constant,
        equalities: Some(LinearConstraints {
            matrix: CscMatrix::from_triplets(eq_rhs.len(), n, &eq_entries)?,
            rhs: eq_rhs,
        }),
        inequalities: Some(LinearConstraints {
            matrix: CscMatrix::from_triplets(ineq_rhs.len(), n, &ineq_entries)?,
            rhs: ineq_rhs,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_config() -> HeatingConfig {
        HeatingConfig {
            horizon: 4,
            max_action: 3.0,
            ..HeatingConfig::default()
        }
    }

    /// Decision vector obtained by rolling the room model forward under `actions`.
    fn rollout(config: &HeatingConfig, start: Scalar, actions: &[Scalar]) -> Vec<Scalar> {
        let layout = HorizonLayout::new(config.horizon);
        let model = config.model();
        let mut z = vec![0.0; layout.nvars()];
        let mut temp = start;
        z[layout.state(0)] = temp;
        for (t, &u) in actions.iter().enumerate() {
            z[layout.action(t)] = u;
            temp = model.next_temperature(temp, u);
            z[layout.state(t + 1)] = temp;
        }
        z
    }

    #[test]
    fn layout_places_actions_before_states() {
        let layout = HorizonLayout::new(3);
        assert_eq!(layout.nvars(), 7);
        assert_eq!(layout.action(2), 2);
        assert_eq!(layout.state(0), 3);
        assert_eq!(layout.state(3), 6);
    }

    #[test]
    fn problem_dimensions_follow_horizon() {
        let config = small_config();
        let problem = build_horizon_problem(&config, 17.0).unwrap();
        assert!(problem.validate().is_ok());
        assert_eq!(problem.nvars(), 9);
        assert_eq!(problem.n_equalities(), 5);
        assert_eq!(problem.n_inequalities(), 16);
        assert_eq!(problem.quadratic.nnz(), 8);
    }

    #[test]
    fn rollout_satisfies_dynamics_and_matches_cost() {
        let config = small_config();
        let start = 18.0;
        let actions = [2.0, 2.5, 1.0, 2.2];
        let problem = build_horizon_problem(&config, start).unwrap();
        let z = rollout(&config, start, &actions);

        assert!(problem.constraint_violation(&z) < 1e-12);

        let layout = HorizonLayout::new(config.horizon);
        let expected: Scalar = (0..config.horizon)
            .map(|t| {
                let u = z[layout.action(t)];
                let x = z[layout.state(t)];
                config.action_weight * u * u
                    + config.deviation_weight * (x - config.desired_temp).powi(2)
            })
            .sum();
        assert_relative_eq!(problem.objective(&z), expected, epsilon = 1e-9);
    }

    #[test]
    fn violations_detect_each_constraint_family() {
        let config = small_config();
        let problem = build_horizon_problem(&config, 18.0).unwrap();

        let mut wrong_start = rollout(&config, 18.0, &[2.0; 4]);
        wrong_start[HorizonLayout::new(4).state(0)] = 18.5;
        assert!(problem.constraint_violation(&wrong_start) > 0.4);

        let over_limit = rollout(&config, 18.0, &[3.5, 0.0, 0.0, 0.0]);
        assert_relative_eq!(problem.constraint_violation(&over_limit), 0.5, epsilon = 1e-12);

        let too_cold = rollout(&config, 16.0, &[0.0; 4]);
        assert!(problem.constraint_violation(&too_cold) > 0.7);
    }
}
