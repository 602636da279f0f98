//! Extraction of a human-usable timetable from the solver's variable values.
//!
//! Solver values are read through a tolerance rule (see `round_binary()`). The resulting
//! `Timetable` answers all questions of the output layer: enrollment counts, teacher and room of
//! each course, per-student schedules and per-period grids. Decoding is a pure function of the
//! solved values, so decoding the same solution twice yields identical timetables.

use crate::catalog::Catalog;
use crate::model::{LinearModel, VarKey};
use crate::solver::SolvedValues;
use crate::Result;
use log::warn;
use std::collections::HashMap;
use std::fmt;

/// Interpret a solver value of a binary variable: values at or above `threshold` are logical 1.
pub fn round_binary(value: f64, threshold: f64) -> bool {
    value >= threshold
}

/// Room of a course in a period, as shown on schedules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomSlot<'a> {
    Room(&'a str),
    /// Filler sections have no room
    NotApplicable,
    /// No room assigned, e.g. because the room constraints were disabled
    Unassigned,
}

impl<'a> fmt::Display for RoomSlot<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomSlot::Room(name) => f.write_str(name),
            RoomSlot::NotApplicable => f.write_str("N/A"),
            RoomSlot::Unassigned => Ok(()),
        }
    }
}

/// One line of a student's schedule
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleRow<'a> {
    pub period: u32,
    pub course: &'a str,
    pub room: RoomSlot<'a>,
    /// Name of the teacher; None for filler sections and courses without teacher
    pub teacher: Option<&'a str>,
}

/// One course in the grid of a period
#[derive(Clone, Debug, PartialEq)]
pub struct GridRow<'a> {
    pub room: RoomSlot<'a>,
    pub course: &'a str,
    pub enrollment: usize,
    pub teacher: Option<&'a str>,
}

/// All (non-filler) courses taught in one period
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodGrid<'a> {
    pub period: u32,
    pub rows: Vec<GridRow<'a>>,
}

/// Preference score of a student's timetable
#[derive(Clone, Debug, PartialEq)]
pub struct StudentDiagnostic<'a> {
    pub student: usize,
    /// Sum of the (positive) preferences for all enrolled courses
    pub score: f64,
    /// Enrolled courses the student did not ask for (non-positive preference)
    pub bad_assignments: Vec<&'a str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timetable<'a> {
    catalog: &'a Catalog,
    /// enrolled[[s, c]]: student s takes course c
    enrolled: ndarray::Array2<bool>,
    /// scheduled[[c, t]]: course c is held in the period at position t
    scheduled: ndarray::Array2<bool>,
    /// (course, period position) -> room index; empty if rooms were not decoded
    rooms: HashMap<(usize, usize), usize>,
    with_rooms: bool,
    enrollment: Vec<usize>,
}

impl<'a> Timetable<'a> {
    /// Read the solved values of `model` into a timetable.
    ///
    /// Room variables are only read if `with_rooms` is set; otherwise their values are
    /// meaningless, as no room constraint was part of the model. Rounded values which violate
    /// model constraints are logged, as they hint at solver numerics trouble.
    pub fn decode(
        catalog: &'a Catalog,
        model: &LinearModel,
        values: &SolvedValues,
        threshold: f64,
        with_rooms: bool,
    ) -> Result<Self> {
        let registry = &model.registry;
        let read = |key: VarKey| -> Result<bool> {
            Ok(round_binary(values.value(registry.get(key)?), threshold))
        };

        let num_students = catalog.students.len();
        let num_courses = catalog.courses.len();
        let num_periods = catalog.periods.len();

        let mut enrolled = ndarray::Array2::from_elem((num_students, num_courses), false);
        for s in 0..num_students {
            for c in 0..num_courses {
                enrolled[[s, c]] = read(VarKey::Enrolled {
                    student: s,
                    course: c,
                })?;
            }
        }
        let mut scheduled = ndarray::Array2::from_elem((num_courses, num_periods), false);
        for c in 0..num_courses {
            for t in 0..num_periods {
                scheduled[[c, t]] = read(VarKey::Scheduled {
                    course: c,
                    period: t,
                })?;
            }
        }
        let mut rooms = HashMap::new();
        if with_rooms {
            for c in catalog.meaningful_courses() {
                for t in 0..num_periods {
                    for r in 0..catalog.rooms.len() {
                        if read(VarKey::InRoom {
                            course: c,
                            room: r,
                            period: t,
                        })? {
                            rooms.insert((c, t), r);
                            break;
                        }
                    }
                }
            }
        }

        let enrollment = (0..num_courses)
            .map(|c| enrolled.column(c).iter().filter(|e| **e).count())
            .collect();

        let rounded: Vec<f64> = values
            .as_slice()
            .iter()
            .map(|v| if round_binary(*v, threshold) { 1.0 } else { 0.0 })
            .collect();
        let violations = model.violations(&rounded);
        if !violations.is_empty() {
            warn!(
                "The rounded solution violates {} constraints (first: {} constraint)",
                violations.len(),
                violations[0].family
            );
        }

        Ok(Timetable {
            catalog,
            enrolled,
            scheduled,
            rooms,
            with_rooms,
            enrollment,
        })
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Whether room assignments are part of this timetable
    pub fn has_rooms(&self) -> bool {
        self.with_rooms
    }

    pub fn is_enrolled(&self, student: usize, course: usize) -> bool {
        self.enrolled[[student, course]]
    }

    pub fn is_scheduled(&self, course: usize, period: usize) -> bool {
        self.scheduled[[course, period]]
    }

    /// Number of students enrolled in the course
    pub fn enrollment(&self, course: usize) -> usize {
        self.enrollment[course]
    }

    /// Position of the (first) period the course is held in
    pub fn period_of(&self, course: usize) -> Option<usize> {
        (0..self.catalog.periods.len()).find(|t| self.scheduled[[course, *t]])
    }

    pub fn teacher(&self, course: usize) -> Option<&'a str> {
        self.catalog.teacher_of(course).map(|t| t.name.as_str())
    }

    pub fn room(&self, course: usize, period: usize) -> RoomSlot<'a> {
        if self.catalog.courses[course].is_filler() {
            return RoomSlot::NotApplicable;
        }
        match self.rooms.get(&(course, period)) {
            Some(r) => RoomSlot::Room(self.catalog.rooms[*r].name.as_str()),
            None => RoomSlot::Unassigned,
        }
    }

    /// The schedule of one student: for each period, the course(s) the student attends
    pub fn student_schedule(&self, student: usize) -> Vec<ScheduleRow<'a>> {
        let mut rows = Vec::new();
        for (t, period) in self.catalog.periods.iter().enumerate() {
            for course in self.catalog.courses.iter() {
                if self.enrolled[[student, course.index]] && self.scheduled[[course.index, t]] {
                    rows.push(ScheduleRow {
                        period: period.label,
                        course: course.name.as_str(),
                        room: self.room(course.index, t),
                        teacher: self.teacher(course.index),
                    });
                }
            }
        }
        rows
    }

    /// The master timetable: for each period all non-filler courses held, ordered by room (if
    /// rooms are assigned) and course.
    pub fn period_grids(&self) -> Vec<PeriodGrid<'a>> {
        let meaningful = self.catalog.meaningful_courses();
        self.catalog
            .periods
            .iter()
            .enumerate()
            .map(|(t, period)| {
                let mut courses: Vec<usize> = meaningful
                    .iter()
                    .copied()
                    .filter(|c| self.scheduled[[*c, t]])
                    .collect();
                courses.sort_by_key(|c| (self.rooms.get(&(*c, t)).copied(), *c));
                PeriodGrid {
                    period: period.label,
                    rows: courses
                        .into_iter()
                        .map(|c| GridRow {
                            room: self.room(c, t),
                            course: self.catalog.courses[c].name.as_str(),
                            enrollment: self.enrollment[c],
                            teacher: self.teacher(c),
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Preference score and unwanted courses of every student
    pub fn diagnostics(&self) -> Vec<StudentDiagnostic<'a>> {
        self.catalog
            .students
            .iter()
            .map(|student| {
                let mut score = 0.0;
                let mut bad_assignments = Vec::new();
                for course in self.catalog.courses.iter() {
                    if !self.enrolled[[student.index, course.index]] {
                        continue;
                    }
                    let preference = self.catalog.preferences[[student.index, course.index]];
                    if preference > 0.0 {
                        score += preference;
                    } else {
                        bad_assignments.push(course.name.as_str());
                    }
                }
                StudentDiagnostic {
                    student: student.index,
                    score,
                    bad_assignments,
                }
            })
            .collect()
    }
}
