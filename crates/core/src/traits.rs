use crate::problem::QuadraticProgram;
use crate::solution::{Assignment, SolveFailure};

/// Convex QP backend used by the controller.
///
/// Implementations must return `Ok` only for solves that reached an optimal
/// point; every other outcome is reported as a [`SolveFailure`].
pub trait QpSolver {
    fn solve(&mut self, problem: &QuadraticProgram) -> Result<Assignment, SolveFailure>;
}

impl<S: QpSolver + ?Sized> QpSolver for &mut S {
    fn solve(&mut self, problem: &QuadraticProgram) -> Result<Assignment, SolveFailure> {
        (**self).solve(problem)
    }
}

impl<S: QpSolver + ?Sized> QpSolver for Box<S> {
    fn solve(&mut self, problem: &QuadraticProgram) -> Result<Assignment, SolveFailure> {
        (**self).solve(problem)
    }
}
