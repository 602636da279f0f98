//! The integer program of the timetable problem.
//!
//! The module provides a small solver-independent representation of a linear model with binary
//! variables (`LinearModel`), the registry of all decision variables (`VariableRegistry`) and
//! `TimetableModel`, which builds the full program from a `Catalog`. Constraint families live in
//! `constraints`, the objective in `objective`. Translating the model to an actual MILP solver is
//! the job of `crate::solver`.

pub mod constraints;
mod objective;
#[cfg(test)]
mod tests;

pub use constraints::ConstraintFamily;

use crate::catalog::Catalog;
use crate::config::ModelConfig;
use crate::decode::Timetable;
use crate::grouping::Structure;
use crate::solver::{SolveOutcome, Solver};
use crate::{Requirement, Result, ScheduleError};
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;

/// Index of a variable in the `VariableRegistry` (and in the solver's value vector)
pub type VarId = usize;

/// Key of a decision variable. Periods are given as positions in the catalog's period list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// X[student, course]: the student is enrolled in the course
    Enrolled { student: usize, course: usize },
    /// CourseAssign[course, period]: the course is scheduled in the period
    Scheduled { course: usize, period: usize },
    /// U[student, course, period]: the student attends the course in the period
    Attends {
        student: usize,
        course: usize,
        period: usize,
    },
    /// RoomAssign[course, room, period]: the course uses the room in the period
    InRoom {
        course: usize,
        room: usize,
        period: usize,
    },
}

impl fmt::Display for VarKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarKey::Enrolled { student, course } => write!(f, "X[{}, {}]", student, course),
            VarKey::Scheduled { course, period } => {
                write!(f, "CourseAssign[{}, {}]", course, period)
            }
            VarKey::Attends {
                student,
                course,
                period,
            } => write!(f, "U[{}, {}, {}]", student, course, period),
            VarKey::InRoom {
                course,
                room,
                period,
            } => write!(f, "RoomAssign[{}, {}, {}]", course, room, period),
        }
    }
}

/// Registry of all binary decision variables with human readable names.
///
/// Variables are numbered in allocation order. Allocating a key twice and looking up a key which
/// has not been allocated are both errors.
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    keys: Vec<VarKey>,
    names: Vec<String>,
    index: HashMap<VarKey, VarId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate all four variable families for the given catalog. Room variables are only created
    /// for non-filler courses.
    pub fn allocate_all(catalog: &Catalog) -> Result<Self> {
        let mut registry = VariableRegistry::new();
        let labels: Vec<u32> = catalog.periods.iter().map(|p| p.label).collect();
        for s in 0..catalog.students.len() {
            for c in 0..catalog.courses.len() {
                registry.allocate(
                    VarKey::Enrolled {
                        student: s,
                        course: c,
                    },
                    format!("Student {} in course {}", s, c),
                )?;
            }
        }
        for c in 0..catalog.courses.len() {
            for (t, label) in labels.iter().enumerate() {
                registry.allocate(
                    VarKey::Scheduled {
                        course: c,
                        period: t,
                    },
                    format!("Course {} in period {}", c, label),
                )?;
            }
        }
        for s in 0..catalog.students.len() {
            for c in 0..catalog.courses.len() {
                for (t, label) in labels.iter().enumerate() {
                    registry.allocate(
                        VarKey::Attends {
                            student: s,
                            course: c,
                            period: t,
                        },
                        format!("Student {} attends course {} in period {}", s, c, label),
                    )?;
                }
            }
        }
        for c in catalog.meaningful_courses() {
            for (r, room) in catalog.rooms.iter().enumerate() {
                for (t, label) in labels.iter().enumerate() {
                    registry.allocate(
                        VarKey::InRoom {
                            course: c,
                            room: r,
                            period: t,
                        },
                        format!("Course {} in room {} during period {}", c, room.name, label),
                    )?;
                }
            }
        }
        debug!("Allocated {} variables", registry.len());
        Ok(registry)
    }

    pub fn allocate(&mut self, key: VarKey, name: String) -> Result<VarId> {
        if self.index.contains_key(&key) {
            return Err(ScheduleError::DuplicateVariable(name));
        }
        let id = self.keys.len();
        self.keys.push(key);
        self.names.push(name);
        self.index.insert(key, id);
        Ok(id)
    }

    pub fn get(&self, key: VarKey) -> Result<VarId> {
        self.index
            .get(&key)
            .copied()
            .ok_or_else(|| ScheduleError::MissingVariable(key.to_string()))
    }

    pub fn x(&self, student: usize, course: usize) -> Result<VarId> {
        self.get(VarKey::Enrolled { student, course })
    }

    pub fn scheduled(&self, course: usize, period: usize) -> Result<VarId> {
        self.get(VarKey::Scheduled { course, period })
    }

    pub fn u(&self, student: usize, course: usize, period: usize) -> Result<VarId> {
        self.get(VarKey::Attends {
            student,
            course,
            period,
        })
    }

    pub fn room(&self, course: usize, room: usize, period: usize) -> Result<VarId> {
        self.get(VarKey::InRoom {
            course,
            room,
            period,
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.names[id]
    }

    pub fn key(&self, id: VarId) -> VarKey {
        self.keys[id]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_str())
    }
}

/// Linear expression over the model's variables (without constant term)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        LinExpr {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    /// The expression `a - b`
    pub fn difference(a: VarId, b: VarId) -> Self {
        LinExpr {
            terms: vec![(a, 1.0), (b, -1.0)],
        }
    }

    pub fn add(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * values[*v]).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sense {
    Eq,
    Le,
    Ge,
}

/// A linear constraint `expr <sense> rhs`, tagged with the family which generated it
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub expr: LinExpr,
    pub sense: Sense,
    pub rhs: f64,
}

/// Tolerance for checking constraints against (rounded) variable values
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

impl Constraint {
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Eq => (lhs - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
            Sense::Le => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            Sense::Ge => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Maximise,
    Minimise,
}

/// A linear program over binary variables, ready to be handed to a `Solver`
#[derive(Clone, Debug)]
pub struct LinearModel {
    pub registry: VariableRegistry,
    pub constraints: Vec<Constraint>,
    pub objective: LinExpr,
    pub direction: Direction,
}

impl LinearModel {
    /// All constraints which are not satisfied by the given variable values
    pub fn violations(&self, values: &[f64]) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values))
            .collect()
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Number of generated constraints per family (only families with constraints are listed)
    pub fn constraint_counts(&self) -> Vec<(ConstraintFamily, usize)> {
        ConstraintFamily::ALL
            .iter()
            .map(|f| (*f, self.constraints.iter().filter(|c| c.family == *f).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

/// The complete timetable program for one scheduling run.
///
/// Every run owns its model. Trying another set of requirements means building a new
/// `TimetableModel`.
#[derive(Debug)]
pub struct TimetableModel {
    pub structure: Structure,
    pub lp: LinearModel,
    config: ModelConfig,
}

impl TimetableModel {
    /// Derive the course structure, allocate all variables and generate the objective and all
    /// constraint families enabled in `config`.
    ///
    /// If `config.requirements_from_course_table` is set, the requirements implied by the course
    /// table are added to the given ones.
    pub fn build(
        catalog: &Catalog,
        requirements: &[Requirement],
        config: &ModelConfig,
    ) -> Result<Self> {
        config.validate()?;
        let structure = Structure::derive(catalog)?;
        let registry = VariableRegistry::allocate_all(catalog)?;

        let mut requirements = requirements.to_vec();
        if config.requirements_from_course_table {
            for r in catalog.implied_requirements() {
                if !requirements.contains(&r) {
                    requirements.push(r);
                }
            }
        }

        let generator = constraints::Generator {
            catalog,
            structure: &structure,
            registry: &registry,
            config,
            requirements: &requirements,
        };
        let mut all_constraints = Vec::new();
        for family in config.constraints.enabled() {
            let generated = generator.generate(family)?;
            info!("Added {} '{}' constraints", generated.len(), family);
            all_constraints.extend(generated);
        }
        let objective = objective::build(catalog, &registry, config)?;
        info!(
            "Model has {} variables and {} constraints",
            registry.len(),
            all_constraints.len()
        );

        Ok(TimetableModel {
            structure,
            lp: LinearModel {
                registry,
                constraints: all_constraints,
                objective,
                direction: Direction::Maximise,
            },
            config: config.clone(),
        })
    }

    pub fn solve<S: Solver>(&self, solver: &S) -> Result<SolveOutcome> {
        solver.solve(&self.lp, &self.config.solve_params())
    }

    /// Decode a solver outcome into a timetable, using the configured rounding threshold
    pub fn decode<'a>(&self, catalog: &'a Catalog, outcome: &SolveOutcome) -> Result<Timetable<'a>> {
        Timetable::decode(
            catalog,
            &self.lp,
            &outcome.values,
            self.config.round_threshold,
            self.config.constraints.rooms,
        )
    }
}
