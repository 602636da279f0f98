//! Run configuration of the model builder: which constraint families are active, proximity
//! bounds, the period layout and the solver parameters.
//!
//! The configuration is read from an optional JSON file. Every field has a default, so an empty
//! object `{}` is a valid configuration.

use crate::model::ConstraintFamily;
use crate::solver::SolveParams;
use crate::{Period, Result, ScheduleError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative optimality gap used when the configuration does not give one
pub const DEFAULT_GAP: f64 = 0.33;

/// Solver values at or above this threshold are read as logical 1. Compensates for the numerical
/// slack of MILP solvers on binary variables.
pub const DEFAULT_ROUND_THRESHOLD: f64 = 0.75;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub constraints: ConstraintToggles,
    pub proximity: ProximityConfig,
    pub periods: Vec<Period>,
    pub gap: Option<f64>,
    /// Time budget of the solver in seconds
    pub time_limit: Option<f64>,
    /// Number of solver threads. Defaults to the number of CPUs.
    pub threads: Option<usize>,
    pub round_threshold: f64,
    /// Objective penalty per enrollment in a filler section
    pub filler_penalty: f64,
    /// Generate grade-level requirements from the course table's "Required Grades" column
    pub requirements_from_course_table: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            constraints: ConstraintToggles::default(),
            proximity: ProximityConfig::default(),
            periods: default_periods(),
            gap: None,
            time_limit: None,
            threads: None,
            round_threshold: DEFAULT_ROUND_THRESHOLD,
            filler_penalty: 1.0,
            requirements_from_course_table: false,
        }
    }
}

/// The school's default day: periods 1, 2, 3, 4, 7 and 8, with no double period starting in the
/// 4th or 8th period.
pub fn default_periods() -> Vec<Period> {
    [1, 2, 3, 4, 7, 8]
        .iter()
        .map(|label| Period {
            label: *label,
            double_start: *label != 4 && *label != 8,
        })
        .collect()
}

impl ModelConfig {
    /// Read a configuration from its JSON representation and check it for sanity
    pub fn read<R: std::io::Read>(reader: R) -> Result<Self> {
        let config: ModelConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.periods.is_empty() {
            return Err(ScheduleError::Schema(
                "Configuration has no periods".to_owned(),
            ));
        }
        if !(self.round_threshold > 0.0 && self.round_threshold <= 1.0) {
            return Err(ScheduleError::Schema(format!(
                "Rounding threshold {} is not within (0, 1]",
                self.round_threshold
            )));
        }
        if let Some(gap) = self.gap {
            if gap < 0.0 {
                return Err(ScheduleError::Schema(format!("Negative gap {}", gap)));
            }
        }
        for (subject, bounds) in self.proximity.subjects.iter() {
            if bounds.min > bounds.max {
                return Err(ScheduleError::Schema(format!(
                    "Proximity minimum > maximum for subject '{}'",
                    subject
                )));
            }
        }
        Ok(())
    }

    pub fn solve_params(&self) -> SolveParams {
        SolveParams {
            gap: self.gap.unwrap_or(DEFAULT_GAP),
            time_limit: self.time_limit,
            threads: self.threads.unwrap_or_else(num_cpus::get),
        }
    }
}

/// Switches for the constraint families. All families are active by default, except for the
/// minimum course sizes, which easily make models with sparse preferences infeasible.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintToggles {
    pub single_assignment: bool,
    pub linking: bool,
    pub max_capacity: bool,
    pub min_capacity: bool,
    pub proximity: bool,
    pub teacher_overlap: bool,
    pub course_periods: bool,
    pub multi_instance: bool,
    pub grade_requirements: bool,
    pub rooms: bool,
    pub filler_placement: bool,
}

impl Default for ConstraintToggles {
    fn default() -> Self {
        ConstraintToggles {
            single_assignment: true,
            linking: true,
            max_capacity: true,
            min_capacity: false,
            proximity: true,
            teacher_overlap: true,
            course_periods: true,
            multi_instance: true,
            grade_requirements: true,
            rooms: true,
            filler_placement: true,
        }
    }
}

impl ConstraintToggles {
    pub fn is_enabled(&self, family: ConstraintFamily) -> bool {
        match family {
            ConstraintFamily::SingleAssignment => self.single_assignment,
            ConstraintFamily::Linking => self.linking,
            ConstraintFamily::Capacity => self.max_capacity || self.min_capacity,
            ConstraintFamily::Proximity => self.proximity,
            ConstraintFamily::TeacherOverlap => self.teacher_overlap,
            ConstraintFamily::CoursePeriods => self.course_periods,
            ConstraintFamily::MultiInstance => self.multi_instance,
            ConstraintFamily::GradeRequirements => self.grade_requirements,
            ConstraintFamily::Rooms => self.rooms,
            ConstraintFamily::FillerPlacement => self.filler_placement,
        }
    }

    pub fn set(&mut self, family: ConstraintFamily, enabled: bool) {
        match family {
            ConstraintFamily::SingleAssignment => self.single_assignment = enabled,
            ConstraintFamily::Linking => self.linking = enabled,
            ConstraintFamily::Capacity => {
                self.max_capacity = enabled;
                self.min_capacity = enabled;
            }
            ConstraintFamily::Proximity => self.proximity = enabled,
            ConstraintFamily::TeacherOverlap => self.teacher_overlap = enabled,
            ConstraintFamily::CoursePeriods => self.course_periods = enabled,
            ConstraintFamily::MultiInstance => self.multi_instance = enabled,
            ConstraintFamily::GradeRequirements => self.grade_requirements = enabled,
            ConstraintFamily::Rooms => self.rooms = enabled,
            ConstraintFamily::FillerPlacement => self.filler_placement = enabled,
        }
    }

    /// All active families, in generation order
    pub fn enabled(&self) -> Vec<ConstraintFamily> {
        ConstraintFamily::ALL
            .iter()
            .copied()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProximityBounds {
    pub min: f64,
    pub max: f64,
}

/// Bounds on the number of courses per subject a student may take
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub default_min: f64,
    pub default_max: f64,
    /// Per-subject overrides of the default bounds
    pub subjects: BTreeMap<String, ProximityBounds>,
    /// Subjects without any proximity constraint
    pub ignored_subjects: Vec<String>,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        ProximityConfig {
            default_min: 0.0,
            default_max: 3.0,
            subjects: BTreeMap::new(),
            ignored_subjects: vec!["Other".to_owned()],
        }
    }
}

impl ProximityConfig {
    /// Bounds for the given subject or None, if the subject is ignored
    pub fn bounds(&self, subject: &str) -> Option<ProximityBounds> {
        if self.ignored_subjects.iter().any(|s| s == subject) {
            return None;
        }
        Some(
            self.subjects
                .get(subject)
                .copied()
                .unwrap_or(ProximityBounds {
                    min: self.default_min,
                    max: self.default_max,
                }),
        )
    }
}
