//! Adapter between [`QuadraticProgram`] and the Clarabel interior-point solver.
//!
//! Equality rows become a zero cone and inequality rows a non-negative cone,
//! so Clarabel's `A z + s = b, s in K` reproduces `A_eq z = b_eq` and
//! `A_in z <= b_in`.

use std::time::Instant;

use ::clarabel::algebra::CscMatrix as ClarabelMatrix;
use ::clarabel::solver::{
    DefaultSettings, DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{self, NonnegativeConeT, ZeroConeT},
};
use heatmpc_core::{
    Assignment, CscMatrix, QpSolver, QuadraticProgram, Scalar, SolveFailure, SolveOptions, Status,
};
use tracing::{debug, trace};

/// Stateless Clarabel backend; every call builds and solves a fresh problem.
#[derive(Debug, Clone, Default)]
pub struct ClarabelBackend {
    options: SolveOptions,
}

impl ClarabelBackend {
    pub fn new(options: SolveOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    fn settings(&self) -> Result<DefaultSettings<Scalar>, SolveFailure> {
        let tol = self.options.tolerance;
        let mut builder = DefaultSettingsBuilder::default();
        builder
            .max_iter(self.options.max_iterations)
            .verbose(self.options.verbose)
            .equilibrate_enable(self.options.equilibrate)
            .tol_gap_abs(tol)
            .tol_gap_rel(tol)
            .tol_feas(tol);
        if let Some(limit) = self.options.max_time {
            builder.time_limit(limit.as_secs_f64());
        }
        builder.build().map_err(|err| {
            SolveFailure::new(Status::SetupFailure, format!("invalid solver settings: {err}"))
        })
    }
}

impl QpSolver for ClarabelBackend {
    fn solve(&mut self, problem: &QuadraticProgram) -> Result<Assignment, SolveFailure> {
        let started = Instant::now();
        problem
            .validate()
            .map_err(|err| SolveFailure::new(Status::SetupFailure, err.to_string()))?;

        let (constraints, rhs, cones) = stack_constraints(problem)?;
        let p = to_clarabel(&problem.quadratic);
        let a = to_clarabel(&constraints);
        trace!(
            nvars = problem.nvars(),
            equalities = problem.n_equalities(),
            inequalities = problem.n_inequalities(),
            nnz = constraints.nnz(),
            "assembled clarabel problem"
        );

        let settings = self.settings()?;
        let mut solver = DefaultSolver::new(&p, &problem.linear, &a, &rhs, &cones, settings)
            .map_err(|err| {
                SolveFailure::new(Status::SetupFailure, format!("clarabel rejected problem: {err:?}"))
            })?;
        solver.solve();

        let solution = &solver.solution;
        let status = map_status(&solution.status);
        debug!(
            %status,
            iterations = solution.iterations,
            elapsed_us = started.elapsed().as_micros() as u64,
            "clarabel solve finished"
        );
        if !status.is_optimal() {
            return Err(SolveFailure::new(
                status,
                format!("clarabel reported {:?}", solution.status),
            ));
        }

        Ok(Assignment {
            objective_value: problem.objective(&solution.x),
            primal: solution.x.clone(),
            iterations: solution.iterations,
            solve_time: started.elapsed(),
        })
    }
}

fn stack_constraints(
    problem: &QuadraticProgram,
) -> Result<(CscMatrix, Vec<Scalar>, Vec<SupportedConeT<Scalar>>), SolveFailure> {
    let mut matrix = CscMatrix::zeros(0, problem.nvars());
    let mut rhs = Vec::with_capacity(problem.n_equalities() + problem.n_inequalities());
    let mut cones = Vec::with_capacity(2);

    let blocks = [
        (problem.equalities.as_ref(), true),
        (problem.inequalities.as_ref(), false),
    ];
    for (block, is_equality) in blocks {
        let Some(block) = block.filter(|block| !block.is_empty()) else {
            continue;
        };
        matrix = matrix
            .vstack(&block.matrix)
            .map_err(|err| SolveFailure::new(Status::SetupFailure, err.to_string()))?;
        rhs.extend_from_slice(&block.rhs);
        cones.push(if is_equality {
            ZeroConeT(block.len())
        } else {
            NonnegativeConeT(block.len())
        });
    }
    Ok((matrix, rhs, cones))
}

fn to_clarabel(matrix: &CscMatrix) -> ClarabelMatrix<Scalar> {
    ClarabelMatrix::new(
        matrix.nrows,
        matrix.ncols,
        matrix.indptr.clone(),
        matrix.indices.clone(),
        matrix.data.clone(),
    )
}

fn map_status(status: &SolverStatus) -> Status {
    match status {
        SolverStatus::Solved => Status::Optimal,
        SolverStatus::AlmostSolved => Status::OptimalInaccurate,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            Status::PrimalInfeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            Status::DualInfeasible
        }
        SolverStatus::MaxIterations => Status::MaxIterations,
        SolverStatus::MaxTime => Status::MaxTime,
        _ => Status::NumericalFailure,
    }
}
