//! Error type shared by all stages of the timetable pipeline.

use thiserror::Error;

/// Errors raised while reading the input tables, building the integer program or solving it.
///
/// Everything up to `MissingVariable` is a construction error and aborts before any solve
/// attempt. `InfeasibleModel`, `SolverTimeout` and `Solver` are solver-time outcomes.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Malformed input: missing columns, unparsable cells, invalid configuration
    #[error("Schema error: {0}")]
    Schema(String),
    /// Row or column counts of joined tables disagree
    #[error("Inconsistent table sizes: {what} has {found} entries, expected {expected}")]
    InconsistentSize {
        what: String,
        expected: usize,
        found: usize,
    },
    /// A requirement or teacher assignment names a course which is not in the course table
    #[error("Unknown course '{0}'")]
    UnknownCourse(String),
    /// The same decision variable was allocated twice
    #[error("Variable '{0}' has already been allocated")]
    DuplicateVariable(String),
    /// A decision variable was looked up before it was allocated
    #[error("No variable has been allocated for {0}")]
    MissingVariable(String),
    /// The solver proved that no feasible timetable exists
    #[error("The model is infeasible. Try disabling some constraint families or relaxing requirements.")]
    InfeasibleModel,
    /// The time budget ran out before optimality (within the gap) was proven
    #[error("Solver stopped at its time limit with best found objective {best_objective}")]
    SolverTimeout { best_objective: f64 },
    /// Any other solver failure
    #[error("Solver failure: {0}")]
    Solver(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
