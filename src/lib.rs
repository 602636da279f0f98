pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod grouping;
pub mod io;
pub mod model;
pub mod solver;

pub use error::{Result, ScheduleError};

use serde::{Deserialize, Serialize};

/// Representation of a student from the school roster
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// id/index of the Student in the roster (and row of the preference matrix)
    #[serde(skip)]
    pub index: usize,
    pub first_name: String,
    pub last_name: String,
    /// Grade level of the student. None, if the roster had no grade for this student. Such
    /// students are not bound by any grade-level requirement.
    pub grade: Option<u32>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Room requirement of a course, as given in the course table's "Room Type" column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    None,
    Science,
    Art,
    Music,
    Gym,
    /// Resource courses are recorded but may use any room
    Resource,
}

impl RoomType {
    /// Parse the room type cell of the course table. Empty cells and "none" are `RoomType::None`.
    pub fn parse(value: &str) -> Option<RoomType> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" | "nan" => Some(RoomType::None),
            "science" => Some(RoomType::Science),
            "art" => Some(RoomType::Art),
            "music" => Some(RoomType::Music),
            "gym" => Some(RoomType::Gym),
            "resource" => Some(RoomType::Resource),
            _ => None,
        }
    }

    /// The room class a course of this type must be taught in, if it is room-restricted
    pub fn required_class(&self) -> Option<RoomClass> {
        match self {
            RoomType::Science => Some(RoomClass::Science),
            RoomType::Art => Some(RoomClass::Art),
            RoomType::Music => Some(RoomClass::Music),
            RoomType::Gym => Some(RoomClass::Gym),
            RoomType::None | RoomType::Resource => None,
        }
    }
}

/// Partition of the school's rooms. Every room belongs to exactly one class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomClass {
    General,
    Science,
    Art,
    Music,
    Gym,
}

/// Kind of a filler section. Filler sections are exempt from room and capacity rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillerKind {
    /// Placeholder section absorbing unmet demand ("Other"), pinned to one period each
    Other,
    /// Empty slot ("Empty")
    Empty,
}

/// Representation of a course section's data
#[derive(Clone, Debug, PartialEq)]
pub struct Course {
    /// id/index of the Course in the course table
    pub index: usize,
    /// Course's name. Parallel instances and both halves of a double period usually share it.
    pub name: String,
    /// Whether this section is the first half of a double period. The second half is always the
    /// next course index.
    pub double_period: bool,
    /// Minimum number of attendees (only enforced when enabled in the config)
    pub num_min: usize,
    /// Maximum number of attendees
    pub num_max: usize,
    pub room_type: RoomType,
    /// Number of co-located sections representing the same logical course (1, 2 or 3)
    pub instances: u32,
    /// Grades which are required to take this course, from the "Required Grades" column
    pub required_grades: Vec<u32>,
}

impl Course {
    pub fn filler_kind(&self) -> Option<FillerKind> {
        if self.name.contains("Other") {
            Some(FillerKind::Other)
        } else if self.name.contains("Empty") {
            Some(FillerKind::Empty)
        } else {
            None
        }
    }

    pub fn is_filler(&self) -> bool {
        self.filler_kind().is_some()
    }
}

/// A teacher and the indexes of all course sections they teach
#[derive(Clone, Debug, PartialEq)]
pub struct Teacher {
    pub name: String,
    pub courses: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub class: RoomClass,
}

/// One school period. Periods are kept as an ordered list; a double period starting in one period
/// continues in the next period of the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Number of the period, as printed on schedules
    pub label: u32,
    /// Whether a double period may start in this period
    #[serde(default = "default_true")]
    pub double_start: bool,
}

fn default_true() -> bool {
    true
}

/// Grade-level requirement: every student of `grade` must take `course1` (and `course2`, if
/// given), in whichever instance of the course.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub course1: String,
    #[serde(default)]
    pub course2: Option<String>,
    pub grade: u32,
}

/// Check the consistency of a normalized data set, e.g. after reading test data
#[cfg(test)]
fn assert_data_consistency(catalog: &catalog::Catalog) {
    for (i, c) in catalog.courses.iter().enumerate() {
        assert_eq!(i, c.index, "Course {} has index {}", i, c.index);
        assert!(c.num_min <= c.num_max, "Course {} has min > max", c.name);
    }
    for (i, s) in catalog.students.iter().enumerate() {
        assert_eq!(i, s.index, "Student {} has index {}", i, s.index);
    }
    for t in catalog.teachers.iter() {
        for c in t.courses.iter() {
            assert!(*c < catalog.courses.len(), "Teacher {} has invalid course {}", t.name, c);
        }
    }
    assert_eq!(
        catalog.preferences.dim(),
        (catalog.students.len(), catalog.courses.len())
    );
}
