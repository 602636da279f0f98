//! Adapter to the MILP solver.
//!
//! The solver itself is a black box: it takes a `LinearModel` and returns a terminal status and
//! a value for each variable. `GoodLpSolver` implements the contract on top of the `good_lp`
//! crate. By default it uses the pure-Rust `microlp` backend, which always solves to proven
//! optimality and ignores gap and time limit. With the `highs` cargo feature, the HiGHS solver is
//! used and gap, time limit and thread count are passed on.

use crate::model::{Direction, LinExpr, LinearModel, Sense, VarId};
use crate::{Result, ScheduleError};
use good_lp::solvers::SolutionStatus;
use good_lp::{variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Instant;

/// Parameters for one solver run
#[derive(Clone, Debug, PartialEq)]
pub struct SolveParams {
    /// Relative optimality gap at which the solver may stop
    pub gap: f64,
    /// Time budget in seconds
    pub time_limit: Option<f64>,
    pub threads: usize,
}

/// Terminal status of a successful solve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal
    Optimal,
    /// Feasible and proven to be within the relative gap of the optimum
    WithinGap,
    /// Best solution found when the time budget ran out
    TimeLimited,
}

/// Raw variable values of a solved model, indexed by `VarId`.
///
/// Only solvers create these, so values can not be queried before solving.
#[derive(Clone, Debug, PartialEq)]
pub struct SolvedValues {
    values: Vec<f64>,
}

impl SolvedValues {
    pub fn new(values: Vec<f64>) -> Self {
        SolvedValues { values }
    }

    pub fn value(&self, id: VarId) -> f64 {
        self.values[id]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Objective value of the returned solution
    pub objective: f64,
    pub values: SolvedValues,
}

impl SolveOutcome {
    /// Turn every outcome without proof of optimality into a `SolverTimeout` error
    pub fn require_optimal(self) -> Result<Self> {
        match self.status {
            SolveStatus::Optimal => Ok(self),
            SolveStatus::WithinGap | SolveStatus::TimeLimited => {
                Err(ScheduleError::SolverTimeout {
                    best_objective: self.objective,
                })
            }
        }
    }
}

/// A MILP solver for binary linear models.
pub trait Solver {
    /// Solve the model. Fails with `InfeasibleModel` if no feasible assignment exists.
    fn solve(&self, model: &LinearModel, params: &SolveParams) -> Result<SolveOutcome>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GoodLpSolver;

impl Solver for GoodLpSolver {
    fn solve(&self, model: &LinearModel, params: &SolveParams) -> Result<SolveOutcome> {
        let mut problem_variables = ProblemVariables::new();
        let variables: Vec<Variable> = model
            .registry
            .names()
            .map(|name| problem_variables.add(variable().binary().name(name)))
            .collect();
        let objective = expression(&model.objective, &variables);
        let problem = match model.direction {
            Direction::Maximise => problem_variables.maximise(objective),
            Direction::Minimise => problem_variables.minimise(objective),
        };
        let constraints: Vec<good_lp::Constraint> = model
            .constraints
            .iter()
            .map(|c| {
                let lhs = expression(&c.expr, &variables);
                match c.sense {
                    Sense::Eq => lhs.eq(c.rhs),
                    Sense::Le => lhs.leq(c.rhs),
                    Sense::Ge => lhs.geq(c.rhs),
                }
            })
            .collect();

        info!(
            "Optimization start time: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let start = Instant::now();

        #[cfg(feature = "highs")]
        let (values, status) = {
            let mut solver = problem
                .using(good_lp::solvers::highs::highs)
                .set_option("mip_rel_gap", params.gap)
                .set_option("threads", params.threads as i32);
            if let Some(limit) = params.time_limit {
                solver = solver.set_option("time_limit", limit);
            }
            run(solver, constraints, &variables)?
        };

        #[cfg(not(feature = "highs"))]
        let (values, status) = {
            if ignores_limits(params) {
                warn!(
                    "microlp always solves to proven optimality: gap {} and time limit {:?} are \
                    not honoured. Build with the 'highs' feature to use them.",
                    params.gap, params.time_limit
                );
            } else {
                debug!("microlp runs single-threaded; ignoring {} threads", params.threads);
            }
            let solver = problem.using(good_lp::solvers::microlp::microlp);
            run(solver, constraints, &variables)?
        };

        info!("Solution found in {:.2?} ({:?})", start.elapsed(), status);
        let objective = model.objective_value(&values);
        Ok(SolveOutcome {
            status,
            objective,
            values: SolvedValues::new(values),
        })
    }
}

fn expression(expr: &LinExpr, variables: &[Variable]) -> Expression {
    let mut result = Expression::with_capacity(expr.terms.len());
    for (v, coefficient) in expr.terms.iter() {
        result.add_mul(*coefficient, variables[*v]);
    }
    result
}

/// Whether the parameters ask for a time limit or a non-default gap, which the exact microlp
/// backend can not honour
#[cfg(not(feature = "highs"))]
fn ignores_limits(params: &SolveParams) -> bool {
    params.time_limit.is_some() || params.gap != crate::config::DEFAULT_GAP
}

/// Translate the termination status reported by good_lp
fn solve_status(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::GapLimit => SolveStatus::WithinGap,
        SolutionStatus::TimeLimit => SolveStatus::TimeLimited,
    }
}

/// Add the constraints to a solver model, solve it and read back all variable values together
/// with the solver's termination status
fn run<M>(
    mut problem: M,
    constraints: Vec<good_lp::Constraint>,
    variables: &[Variable],
) -> Result<(Vec<f64>, SolveStatus)>
where
    M: SolverModel<Error = ResolutionError>,
{
    for constraint in constraints {
        problem.add_constraint(constraint);
    }
    let solution = problem.solve().map_err(|e| match e {
        ResolutionError::Infeasible => ScheduleError::InfeasibleModel,
        other => ScheduleError::Solver(other.to_string()),
    })?;
    let values = variables.iter().map(|v| solution.value(*v)).collect();
    Ok((values, solve_status(solution.status())))
}
