pub mod rooms;
pub mod simple;
pub mod tables;

use crate::decode::Timetable;
use crate::Result;
use log::{debug, info};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Format the master timetable into a human readable String (e.g. to print it to stdout).
///
/// The output format will look like
/// ```text
/// ===== Period 1 =====
/// Sci A        Biology                         12  Ms. Green
/// U1           Painting                         8  Mr. Blue
///
/// ===== Period 2 =====
/// …
/// ```
/// The room column is left out when the timetable has no room assignments.
pub fn format_grid(timetable: &Timetable) -> String {
    let mut result = String::new();
    for grid in timetable.period_grids() {
        write!(result, "\n===== Period {} =====\n", grid.period).unwrap();
        for row in grid.rows {
            if timetable.has_rooms() {
                write!(result, "{:<12} ", row.room.to_string()).unwrap();
            }
            write!(
                result,
                "{:<30} {:>3}  {}\n",
                row.course,
                row.enrollment,
                row.teacher.unwrap_or("")
            )
            .unwrap();
        }
    }
    result
}

/// Format the schedule of one student into a human readable String.
///
/// ```text
/// Anton Administrator (grade 9)
/// Period 1: Biology | Room: Sci A | Teacher: Ms. Green
/// Period 2: Other 1 | Room: N/A | Teacher:
/// ```
pub fn format_student_schedule(timetable: &Timetable, student: usize) -> String {
    let s = &timetable.catalog().students[student];
    let mut result = s.full_name();
    if let Some(grade) = s.grade {
        write!(result, " (grade {})", grade).unwrap();
    }
    result.push('\n');
    for row in timetable.student_schedule(student) {
        write!(result, "Period {}: {}", row.period, row.course).unwrap();
        if timetable.has_rooms() {
            write!(result, " | Room: {}", row.room).unwrap();
        }
        write!(result, " | Teacher: {}\n", row.teacher.unwrap_or("")).unwrap();
    }
    result
}

/// File name of a student's schedule file, e.g. `Administrator_Anton_schedule.txt`
fn schedule_file_name(first_name: &str, last_name: &str) -> String {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
            .collect()
    };
    format!("{}_{}_schedule.txt", clean(last_name), clean(first_name))
}

/// Write one schedule text file per student into the directory `dir`. Students without a grade
/// are skipped. Returns the paths of the written files.
pub fn write_student_schedules(dir: &Path, timetable: &Timetable) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for student in timetable.catalog().students.iter() {
        if student.grade.is_none() {
            debug!(
                "Skipping schedule of {}, who has no grade",
                student.full_name()
            );
            continue;
        }
        let path = dir.join(schedule_file_name(&student.first_name, &student.last_name));
        std::fs::write(&path, format_student_schedule(timetable, student.index))?;
        written.push(path);
    }
    info!("Wrote {} student schedules to {}", written.len(), dir.display());
    Ok(written)
}

/// Format the preference scores and unwanted courses of all students into a human readable
/// String.
pub fn format_diagnostics(timetable: &Timetable) -> String {
    let students = &timetable.catalog().students;
    let mut result = String::new();
    for diagnostic in timetable.diagnostics() {
        write!(
            result,
            "{}: score {}",
            students[diagnostic.student].full_name(),
            diagnostic.score
        )
        .unwrap();
        if !diagnostic.bad_assignments.is_empty() {
            write!(
                result,
                "; not requested: {}",
                diagnostic.bad_assignments.join(", ")
            )
            .unwrap();
        }
        result.push('\n');
    }
    result
}
