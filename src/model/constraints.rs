//! The constraint families of the timetable program.
//!
//! Every family only reads the catalog, the derived structure and the variable registry, so the
//! families can be enabled and disabled independently (see `config::ConstraintToggles`). Disabling
//! families is the main tool to find out which part of the input renders a model infeasible.

use super::{Constraint, LinExpr, Sense, VariableRegistry};
use crate::catalog::Catalog;
use crate::config::ModelConfig;
use crate::grouping::Structure;
use crate::{Requirement, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// Every student attends exactly one course per period
    SingleAssignment,
    /// Enrollment (X) and attendance (U) are consistent with the course's period
    Linking,
    /// Course sizes
    Capacity,
    /// Number of courses per subject for each student
    Proximity,
    /// A teacher teaches at most one course per period
    TeacherOverlap,
    /// Each course is held once; double periods are consecutive and share their students
    CoursePeriods,
    /// A student takes at most one instance of a multi-instance course
    MultiInstance,
    /// Grade-level requirements
    GradeRequirements,
    /// Room assignment
    Rooms,
    /// Placeholder fillers are pinned to one period each
    FillerPlacement,
}

impl ConstraintFamily {
    pub const ALL: [ConstraintFamily; 10] = [
        ConstraintFamily::SingleAssignment,
        ConstraintFamily::Linking,
        ConstraintFamily::Capacity,
        ConstraintFamily::Proximity,
        ConstraintFamily::TeacherOverlap,
        ConstraintFamily::CoursePeriods,
        ConstraintFamily::MultiInstance,
        ConstraintFamily::GradeRequirements,
        ConstraintFamily::Rooms,
        ConstraintFamily::FillerPlacement,
    ];
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintFamily::SingleAssignment => "one course per period",
            ConstraintFamily::Linking => "enrollment linking",
            ConstraintFamily::Capacity => "course capacity",
            ConstraintFamily::Proximity => "subject proximity",
            ConstraintFamily::TeacherOverlap => "teacher overlap",
            ConstraintFamily::CoursePeriods => "course periods",
            ConstraintFamily::MultiInstance => "multi-instance",
            ConstraintFamily::GradeRequirements => "grade requirement",
            ConstraintFamily::Rooms => "room",
            ConstraintFamily::FillerPlacement => "filler placement",
        };
        f.write_str(name)
    }
}

/// Everything a constraint family needs to know about the problem
pub struct Generator<'a> {
    pub catalog: &'a Catalog,
    pub structure: &'a Structure,
    pub registry: &'a VariableRegistry,
    pub config: &'a ModelConfig,
    pub requirements: &'a [Requirement],
}

/// Collects the constraints of one family
struct Family {
    family: ConstraintFamily,
    constraints: Vec<Constraint>,
}

impl Family {
    fn new(family: ConstraintFamily) -> Self {
        Family {
            family,
            constraints: Vec::new(),
        }
    }

    fn push(&mut self, expr: LinExpr, sense: Sense, rhs: f64) {
        self.constraints.push(Constraint {
            family: self.family,
            expr,
            sense,
            rhs,
        });
    }
}

impl<'a> Generator<'a> {
    pub fn generate(&self, family: ConstraintFamily) -> Result<Vec<Constraint>> {
        let mut out = Family::new(family);
        match family {
            ConstraintFamily::SingleAssignment => self.single_assignment(&mut out)?,
            ConstraintFamily::Linking => self.linking(&mut out)?,
            ConstraintFamily::Capacity => self.capacity(&mut out)?,
            ConstraintFamily::Proximity => self.proximity(&mut out)?,
            ConstraintFamily::TeacherOverlap => self.teacher_overlap(&mut out)?,
            ConstraintFamily::CoursePeriods => self.course_periods(&mut out)?,
            ConstraintFamily::MultiInstance => self.multi_instance(&mut out)?,
            ConstraintFamily::GradeRequirements => self.grade_requirements(&mut out)?,
            ConstraintFamily::Rooms => self.rooms(&mut out)?,
            ConstraintFamily::FillerPlacement => self.filler_placement(&mut out)?,
        }
        Ok(out.constraints)
    }

    fn num_students(&self) -> usize {
        self.catalog.students.len()
    }

    fn num_courses(&self) -> usize {
        self.catalog.courses.len()
    }

    fn num_periods(&self) -> usize {
        self.catalog.periods.len()
    }

    fn single_assignment(&self, out: &mut Family) -> Result<()> {
        for s in 0..self.num_students() {
            for t in 0..self.num_periods() {
                let attended = (0..self.num_courses())
                    .map(|c| self.registry.u(s, c, t))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LinExpr::sum(attended), Sense::Eq, 1.0);
            }
        }
        Ok(())
    }

    fn linking(&self, out: &mut Family) -> Result<()> {
        for s in 0..self.num_students() {
            for c in 0..self.num_courses() {
                // X[s,c] - sum_t U[s,c,t] == 0
                let mut expr = LinExpr::new();
                expr.add(self.registry.x(s, c)?, 1.0);
                for t in 0..self.num_periods() {
                    expr.add(self.registry.u(s, c, t)?, -1.0);
                }
                out.push(expr, Sense::Eq, 0.0);

                for t in 0..self.num_periods() {
                    out.push(
                        LinExpr::difference(
                            self.registry.scheduled(c, t)?,
                            self.registry.u(s, c, t)?,
                        ),
                        Sense::Ge,
                        0.0,
                    );
                }
            }
        }
        Ok(())
    }

    fn capacity(&self, out: &mut Family) -> Result<()> {
        let toggles = &self.config.constraints;
        for course in self.catalog.courses.iter().filter(|c| !c.is_filler()) {
            let enrolled = (0..self.num_students())
                .map(|s| self.registry.x(s, course.index))
                .collect::<Result<Vec<_>>>()?;
            if enrolled.is_empty() {
                continue;
            }
            if toggles.max_capacity {
                out.push(
                    LinExpr::sum(enrolled.iter().copied()),
                    Sense::Le,
                    course.num_max as f64,
                );
            }
            if toggles.min_capacity && course.num_min > 0 {
                out.push(LinExpr::sum(enrolled), Sense::Ge, course.num_min as f64);
            }
        }
        Ok(())
    }

    fn proximity(&self, out: &mut Family) -> Result<()> {
        for subject in self.catalog.subjects.iter() {
            let bounds = match self.config.proximity.bounds(&subject.name) {
                Some(b) => b,
                None => {
                    debug!("No proximity constraints for subject '{}'", subject.name);
                    continue;
                }
            };
            for s in 0..self.num_students() {
                let mut expr = LinExpr::new();
                for (c, weight) in subject.weights.iter().enumerate() {
                    expr.add(self.registry.x(s, c)?, *weight);
                }
                if expr.terms.is_empty() {
                    continue;
                }
                if bounds.min > 0.0 {
                    out.push(expr.clone(), Sense::Ge, bounds.min);
                }
                out.push(expr, Sense::Le, bounds.max);
            }
        }
        Ok(())
    }

    fn teacher_overlap(&self, out: &mut Family) -> Result<()> {
        for teacher in self.catalog.teachers.iter().filter(|t| !t.courses.is_empty()) {
            for t in 0..self.num_periods() {
                let taught = teacher
                    .courses
                    .iter()
                    .map(|c| self.registry.scheduled(*c, t))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LinExpr::sum(taught), Sense::Le, 1.0);
            }
        }
        Ok(())
    }

    fn course_periods(&self, out: &mut Family) -> Result<()> {
        for c in 0..self.num_courses() {
            let periods = (0..self.num_periods())
                .map(|t| self.registry.scheduled(c, t))
                .collect::<Result<Vec<_>>>()?;
            out.push(LinExpr::sum(periods), Sense::Eq, 1.0);
        }

        for pair in self.structure.double_pairs.iter() {
            for t in 0..self.num_periods() {
                let first = self.registry.scheduled(pair.first, t)?;
                match self.catalog.next_period(t) {
                    Some(next) if self.catalog.double_start_allowed(t) => {
                        let second = self.registry.scheduled(pair.second, next)?;
                        out.push(LinExpr::difference(first, second), Sense::Eq, 0.0);
                    }
                    _ => out.push(LinExpr::sum(vec![first]), Sense::Eq, 0.0),
                }
            }
            for s in 0..self.num_students() {
                out.push(
                    LinExpr::difference(
                        self.registry.x(s, pair.second)?,
                        self.registry.x(s, pair.first)?,
                    ),
                    Sense::Eq,
                    0.0,
                );
            }
        }
        Ok(())
    }

    fn multi_instance(&self, out: &mut Family) -> Result<()> {
        for s in 0..self.num_students() {
            for group in self.structure.multi_groups.iter() {
                let enrolled = group
                    .members
                    .iter()
                    .map(|c| self.registry.x(s, *c))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LinExpr::sum(enrolled), Sense::Le, 1.0);
            }
        }
        Ok(())
    }

    fn grade_requirements(&self, out: &mut Family) -> Result<()> {
        for requirement in self.requirements.iter() {
            let first = self.catalog.course_index(&requirement.course1)?;
            let mut sections = self.structure.resolve_instances(first);
            if let Some(course2) = &requirement.course2 {
                let second = self.catalog.course_index(course2)?;
                sections.extend(self.structure.resolve_instances(second));
            }

            let mut bound_students = 0;
            for student in self
                .catalog
                .students
                .iter()
                .filter(|s| s.grade == Some(requirement.grade))
            {
                let enrolled = sections
                    .iter()
                    .map(|c| self.registry.x(student.index, *c))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LinExpr::sum(enrolled), Sense::Eq, 1.0);
                bound_students += 1;
            }
            if bound_students == 0 {
                warn!(
                    "Requirement for '{}' does not apply to any student: no student in grade {}",
                    requirement.course1, requirement.grade
                );
            }
        }
        Ok(())
    }

    fn rooms(&self, out: &mut Family) -> Result<()> {
        let meaningful = self.catalog.meaningful_courses();
        let num_rooms = self.catalog.rooms.len();

        // A scheduled course gets exactly one room, an unscheduled one none
        for c in meaningful.iter() {
            for t in 0..self.num_periods() {
                let mut expr = LinExpr::new();
                for r in 0..num_rooms {
                    expr.add(self.registry.room(*c, r, t)?, 1.0);
                }
                expr.add(self.registry.scheduled(*c, t)?, -1.0);
                out.push(expr, Sense::Eq, 0.0);
            }
        }

        for r in 0..num_rooms {
            for t in 0..self.num_periods() {
                let hosted = meaningful
                    .iter()
                    .map(|c| self.registry.room(*c, r, t))
                    .collect::<Result<Vec<_>>>()?;
                out.push(LinExpr::sum(hosted), Sense::Le, 1.0);
            }
        }

        // Both halves of a double period in the same room
        for pair in self.structure.double_pairs.iter() {
            if self.catalog.courses[pair.first].is_filler()
                || self.catalog.courses[pair.second].is_filler()
            {
                continue;
            }
            for t in 0..self.num_periods() {
                let next = match self.catalog.next_period(t) {
                    Some(next) if self.catalog.double_start_allowed(t) => next,
                    _ => continue,
                };
                for r in 0..num_rooms {
                    out.push(
                        LinExpr::difference(
                            self.registry.room(pair.first, r, t)?,
                            self.registry.room(pair.second, r, next)?,
                        ),
                        Sense::Eq,
                        0.0,
                    );
                }
            }
        }

        for (c, _class) in self.structure.restricted_courses.iter() {
            let eligible = self.structure.eligible_rooms(*c).unwrap_or(&[]);
            for t in 0..self.num_periods() {
                let mut expr = LinExpr::new();
                for r in eligible.iter() {
                    expr.add(self.registry.room(*c, *r, t)?, 1.0);
                }
                expr.add(self.registry.scheduled(*c, t)?, -1.0);
                out.push(expr, Sense::Eq, 0.0);
            }
        }
        Ok(())
    }

    fn filler_placement(&self, out: &mut Family) -> Result<()> {
        for (c, t) in self.structure.filler_placement.iter() {
            out.push(
                LinExpr::sum(vec![self.registry.scheduled(*c, *t)?]),
                Sense::Eq,
                1.0,
            );
        }
        Ok(())
    }
}
