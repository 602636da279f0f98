//! IO functionality for the simple JSON formats: the list of grade-level requirements and the
//! machine-readable timetable result.

use crate::decode::{RoomSlot, Timetable};
use crate::solver::SolveOutcome;
use crate::{Requirement, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Read the list of grade-level requirements (canonical serde_json serialization of
/// `Requirement` objects), e.g.
///
/// ```json
/// [{"course1": "Biology", "course2": "Chemistry", "grade": 9}, {"course1": "Art", "grade": 10}]
/// ```
pub fn read_requirements<R: std::io::Read>(reader: R) -> Result<Vec<Requirement>> {
    Ok(serde_json::from_reader(reader)?)
}

fn room_value(room: RoomSlot) -> serde_json::Value {
    match room {
        RoomSlot::Unassigned => serde_json::Value::Null,
        other => json!(other.to_string()),
    }
}

/// Write the timetable as simple JSON representation to a Writer (e.g. an output file).
///
/// The file contains the solve status and objective, each student's schedule and the grid of
/// every period.
pub fn write<W: std::io::Write>(
    writer: W,
    timetable: &Timetable,
    outcome: &SolveOutcome,
) -> Result<()> {
    let catalog = timetable.catalog();
    let students: Vec<serde_json::Value> = catalog
        .students
        .iter()
        .map(|student| {
            let schedule: Vec<serde_json::Value> = timetable
                .student_schedule(student.index)
                .into_iter()
                .map(|row| {
                    json!({
                        "period": row.period,
                        "course": row.course,
                        "room": room_value(row.room),
                        "teacher": row.teacher.unwrap_or(""),
                    })
                })
                .collect();
            json!({
                "first_name": student.first_name,
                "last_name": student.last_name,
                "grade": student.grade,
                "schedule": schedule,
            })
        })
        .collect();
    let periods: Vec<serde_json::Value> = timetable
        .period_grids()
        .into_iter()
        .map(|grid| {
            let courses: Vec<serde_json::Value> = grid
                .rows
                .into_iter()
                .map(|row| {
                    json!({
                        "room": room_value(row.room),
                        "course": row.course,
                        "enrollment": row.enrollment,
                        "teacher": row.teacher.unwrap_or(""),
                    })
                })
                .collect();
            json!({
                "period": grid.period,
                "courses": courses,
            })
        })
        .collect();

    let data = json!({
        "format": "X-timetable-simple",
        "version": "1.0",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "status": outcome.status,
        "objective": outcome.objective,
        "students": students,
        "periods": periods,
    });
    serde_json::to_writer(writer, &data)?;

    Ok(())
}
