//! Derived structural relations of the course catalog.
//!
//! The course table encodes structure by position: the second half of a double period is always
//! the next course index, and parallel instances of a course occupy consecutive indexes. This
//! module is the only place which knows about that convention. It turns it into explicit
//! `DoublePeriodPair` and `MultiInstanceGroup` relations, which all later stages use.

use crate::catalog::Catalog;
use crate::{Course, FillerKind, Result, RoomClass, ScheduleError};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Both halves of one logical double-length course. Both halves share period (offset by one),
/// room and students.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoublePeriodPair {
    pub first: usize,
    pub second: usize,
}

/// Parallel sections of the same logical course. A student takes at most one of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiInstanceGroup {
    pub members: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    pub double_pairs: Vec<DoublePeriodPair>,
    pub multi_groups: Vec<MultiInstanceGroup>,
    /// Room indexes of each room class
    pub rooms_by_class: BTreeMap<RoomClass, Vec<usize>>,
    /// Room-restricted courses with the room class they require
    pub restricted_courses: Vec<(usize, RoomClass)>,
    /// (course, period position) pairs pinning placeholder fillers to periods
    pub filler_placement: Vec<(usize, usize)>,
}

impl Structure {
    pub fn derive(catalog: &Catalog) -> Result<Self> {
        let double_pairs = double_period_pairs(&catalog.courses)?;
        let multi_groups = multi_instance_groups(&catalog.courses)?;

        let mut rooms_by_class: BTreeMap<RoomClass, Vec<usize>> = BTreeMap::new();
        for (i, room) in catalog.rooms.iter().enumerate() {
            rooms_by_class.entry(room.class).or_default().push(i);
        }

        let restricted_courses: Vec<(usize, RoomClass)> = catalog
            .courses
            .iter()
            .filter(|c| !c.is_filler())
            .filter_map(|c| c.room_type.required_class().map(|class| (c.index, class)))
            .collect();
        for (course, class) in restricted_courses.iter() {
            if !rooms_by_class.contains_key(class) {
                warn!(
                    "Course '{}' needs a {:?} room, but there is none.",
                    catalog.courses[*course].name, class
                );
            }
        }

        let placeholders: Vec<usize> = catalog
            .courses
            .iter()
            .filter(|c| c.filler_kind() == Some(FillerKind::Other))
            .map(|c| c.index)
            .collect();
        if placeholders.len() != catalog.periods.len() {
            warn!(
                "There are {} 'Other' sections for {} periods. Only the first {} periods get one.",
                placeholders.len(),
                catalog.periods.len(),
                placeholders.len().min(catalog.periods.len())
            );
        }
        let filler_placement = placeholders
            .into_iter()
            .zip(0..catalog.periods.len())
            .collect();

        debug!(
            "Found {} double periods and {} multi-instance courses",
            double_pairs.len(),
            multi_groups.len()
        );

        Ok(Structure {
            double_pairs,
            multi_groups,
            rooms_by_class,
            restricted_courses,
            filler_placement,
        })
    }

    /// The multi-instance group containing the given course, if any
    pub fn group_of(&self, course: usize) -> Option<&MultiInstanceGroup> {
        self.multi_groups.iter().find(|g| g.members.contains(&course))
    }

    /// All sections which satisfy a requirement for the given course: its multi-instance group or
    /// the course alone.
    pub fn resolve_instances(&self, course: usize) -> Vec<usize> {
        match self.group_of(course) {
            Some(group) => group.members.clone(),
            None => vec![course],
        }
    }

    /// Room indexes a course may be taught in. None, if the course is not room-restricted.
    pub fn eligible_rooms(&self, course: usize) -> Option<&[usize]> {
        self.restricted_courses
            .iter()
            .find(|(c, _)| *c == course)
            .map(|(_, class)| {
                self.rooms_by_class
                    .get(class)
                    .map(|rooms| rooms.as_slice())
                    .unwrap_or(&[])
            })
    }
}

fn double_period_pairs(courses: &[Course]) -> Result<Vec<DoublePeriodPair>> {
    let mut pairs = Vec::new();
    for course in courses.iter().filter(|c| c.double_period) {
        let second = course.index + 1;
        if second >= courses.len() {
            return Err(ScheduleError::Schema(format!(
                "Double period course '{}' has no second half",
                course.name
            )));
        }
        if courses[second].double_period {
            return Err(ScheduleError::Schema(format!(
                "Second half of double period course '{}' is marked as double period itself",
                course.name
            )));
        }
        pairs.push(DoublePeriodPair {
            first: course.index,
            second,
        });
    }
    Ok(pairs)
}

/// Scan the course list for parallel instances.
///
/// A 2-instance double period course occupies four indexes (two halves per instance), so its
/// instances are `j` and `j+2`. 3-instance courses are never double periods.
fn multi_instance_groups(courses: &[Course]) -> Result<Vec<MultiInstanceGroup>> {
    let mut groups = Vec::new();
    let mut j = 0;
    while j < courses.len() {
        let course = &courses[j];
        let (members, width) = match course.instances {
            2 if course.double_period => {
                if let Some(other) = mismatched_second_instance(courses, j) {
                    warn!(
                        "Course '{}' has 2 double period instances, but course {} ('{}') is not \
                        a double period of the same name. Grouping it anyway.",
                        course.name, other.index, other.name
                    );
                }
                (vec![j, j + 2], 4)
            }
            2 => (vec![j, j + 1], 2),
            3 => {
                if course.double_period {
                    warn!(
                        "Course '{}' has 3 instances and is a double period. Its instances are \
                        grouped as single periods.",
                        course.name
                    );
                }
                (vec![j, j + 1, j + 2], 3)
            }
            _ => (vec![], 1),
        };
        if let Some(last) = members.last() {
            if *last >= courses.len() {
                return Err(ScheduleError::Schema(format!(
                    "Course '{}' has {} instances, but the course table ends before the last one",
                    course.name, course.instances
                )));
            }
            groups.push(MultiInstanceGroup { members });
        }
        j += width;
    }
    Ok(groups)
}

/// The course at `j+2`, if it exists but does not look like the second instance of the
/// 2-instance double period course at `j`.
fn mismatched_second_instance(courses: &[Course], j: usize) -> Option<&Course> {
    courses
        .get(j + 2)
        .filter(|other| !other.double_period || other.name != courses[j].name)
}
