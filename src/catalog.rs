//! Normalized, typed view of all input tables.
//!
//! A `Catalog` is created once from the raw tables (see `io::tables`) and is immutable
//! afterwards. Its constructor checks that the tables fit together, so all later stages may index
//! the preference matrix and proximity vectors by student and course index without further checks.

use crate::{Course, Period, Requirement, Result, Room, ScheduleError, Student, Teacher};
use log::{debug, warn};

/// A subject of the proximity table with its per-course membership weights
#[derive(Clone, Debug, PartialEq)]
pub struct Subject {
    pub name: String,
    /// One weight per course (1 if the course belongs to the subject, 0 otherwise)
    pub weights: ndarray::Array1<f64>,
}

/// One row of the teacher table: a teacher and the name of a course they teach
#[derive(Clone, Debug, PartialEq)]
pub struct TeacherAssignment {
    pub teacher: String,
    pub course: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    pub periods: Vec<Period>,
    /// Preference scores, one row per student and one column per course
    pub preferences: ndarray::Array2<f64>,
    pub subjects: Vec<Subject>,
}

impl Catalog {
    /// Join the normalized tables into a catalog.
    ///
    /// Course and student indexes are (re)assigned by position. Teachers are created in order of
    /// their first appearance in the teacher table; each teacher teaches every course section
    /// whose name equals one of their course references.
    ///
    /// # Errors
    ///
    /// * `InconsistentSize`, if the preference matrix does not have one row per student and one
    ///   column per course, or a subject's weight vector does not have one entry per course
    /// * `UnknownCourse`, if the teacher table references a course name which is not offered
    /// * `Schema`, if no periods are given, a course has min > max or a room name is duplicated
    pub fn new(
        mut courses: Vec<Course>,
        mut students: Vec<Student>,
        teacher_assignments: &[TeacherAssignment],
        rooms: Vec<Room>,
        periods: Vec<Period>,
        preferences: ndarray::Array2<f64>,
        subjects: Vec<Subject>,
    ) -> Result<Self> {
        for (i, c) in courses.iter_mut().enumerate() {
            c.index = i;
            if c.num_min > c.num_max {
                return Err(ScheduleError::Schema(format!(
                    "Min size > max size for course '{}'",
                    c.name
                )));
            }
        }
        for (i, s) in students.iter_mut().enumerate() {
            s.index = i;
        }
        if periods.is_empty() {
            return Err(ScheduleError::Schema("No periods given".to_owned()));
        }

        let (rows, columns) = preferences.dim();
        if rows != students.len() {
            return Err(ScheduleError::InconsistentSize {
                what: "preference matrix rows".to_owned(),
                expected: students.len(),
                found: rows,
            });
        }
        if columns != courses.len() {
            return Err(ScheduleError::InconsistentSize {
                what: "preference matrix columns".to_owned(),
                expected: courses.len(),
                found: columns,
            });
        }
        for subject in subjects.iter() {
            if subject.weights.len() != courses.len() {
                return Err(ScheduleError::InconsistentSize {
                    what: format!("proximity column '{}'", subject.name),
                    expected: courses.len(),
                    found: subject.weights.len(),
                });
            }
        }
        for (i, room) in rooms.iter().enumerate() {
            if rooms[..i].iter().any(|r| r.name == room.name) {
                return Err(ScheduleError::Schema(format!(
                    "Room '{}' is listed twice",
                    room.name
                )));
            }
        }

        let teachers = build_teachers(teacher_assignments, &courses)?;
        debug!(
            "Catalog with {} courses, {} students, {} teachers, {} rooms and {} periods",
            courses.len(),
            students.len(),
            teachers.len(),
            rooms.len(),
            periods.len()
        );

        Ok(Catalog {
            courses,
            students,
            teachers,
            rooms,
            periods,
            preferences,
            subjects,
        })
    }

    /// Indexes of all courses which are not filler sections
    pub fn meaningful_courses(&self) -> Vec<usize> {
        self.courses
            .iter()
            .filter(|c| !c.is_filler())
            .map(|c| c.index)
            .collect()
    }

    /// Indexes of all filler sections ("Other" and "Empty")
    pub fn filler_courses(&self) -> Vec<usize> {
        self.courses
            .iter()
            .filter(|c| c.is_filler())
            .map(|c| c.index)
            .collect()
    }

    /// Index of the first course with the given name
    pub fn course_index(&self, name: &str) -> Result<usize> {
        self.courses
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ScheduleError::UnknownCourse(name.to_owned()))
    }

    /// The first teacher (in teacher table order) teaching the given course
    pub fn teacher_of(&self, course: usize) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.courses.contains(&course))
    }

    /// Position of the period following the period at position `t`, if any
    pub fn next_period(&self, t: usize) -> Option<usize> {
        if t + 1 < self.periods.len() {
            Some(t + 1)
        } else {
            None
        }
    }

    /// Whether a double period may start in the period at position `t`. It must be allowed by the
    /// period layout and there must be a following period.
    pub fn double_start_allowed(&self, t: usize) -> bool {
        self.periods[t].double_start && self.next_period(t).is_some()
    }

    /// Grade-level requirements derived from the "Required Grades" column of the course table.
    ///
    /// Each course name yields at most one requirement per grade, even when multiple sections
    /// (instances or double period halves) carry the column.
    pub fn implied_requirements(&self) -> Vec<Requirement> {
        let mut requirements: Vec<Requirement> = Vec::new();
        for course in self.courses.iter() {
            for grade in course.required_grades.iter() {
                let requirement = Requirement {
                    course1: course.name.clone(),
                    course2: None,
                    grade: *grade,
                };
                if !requirements.contains(&requirement) {
                    requirements.push(requirement);
                }
            }
        }
        requirements
    }
}

/// Create the list of teachers from the rows of the teacher table.
fn build_teachers(
    assignments: &[TeacherAssignment],
    courses: &[Course],
) -> Result<Vec<Teacher>> {
    let mut teachers: Vec<Teacher> = Vec::new();
    for assignment in assignments {
        let indexes: Vec<usize> = courses
            .iter()
            .filter(|c| c.name == assignment.course)
            .map(|c| c.index)
            .collect();
        if indexes.is_empty() {
            return Err(ScheduleError::UnknownCourse(assignment.course.clone()));
        }
        let position = match teachers.iter().position(|t| t.name == assignment.teacher) {
            Some(p) => p,
            None => {
                teachers.push(Teacher {
                    name: assignment.teacher.clone(),
                    courses: Vec::new(),
                });
                teachers.len() - 1
            }
        };
        let teacher = &mut teachers[position];
        for index in indexes {
            if !teacher.courses.contains(&index) {
                teacher.courses.push(index);
            }
        }
    }
    for teacher in teachers.iter() {
        if teacher.courses.iter().any(|c| courses[*c].is_filler()) {
            warn!("Teacher '{}' is assigned to a filler section", teacher.name);
        }
    }
    Ok(teachers)
}
